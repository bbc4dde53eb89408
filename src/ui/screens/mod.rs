pub(crate) mod expenses;
pub(crate) mod home;
pub(crate) mod settings;
pub(crate) mod stats;

use crate::ui::app::Screen;

/// Rows the expense table can show on `screen`, given the main content height.
pub(crate) fn table_rows(screen: Screen, content_height: u16) -> usize {
    let above = match screen {
        Screen::Home => home::CARDS_HEIGHT + home::ADVICE_HEIGHT,
        Screen::Stats => stats::BREAKDOWN_HEIGHT,
        Screen::Settings => 0,
    };
    // Table borders plus header row
    content_height.saturating_sub(above + 3).max(1) as usize
}
