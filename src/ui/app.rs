use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::Arc;

use chrono::{Local, Utc};

use crate::advice::{self, AdviceService, AdviceSession};
use crate::analytics::{self, CategoryTotal};
use crate::db::Database;
use crate::models::{Category, Expense};
use crate::state::{dispatch, Action, Answered, AppState, Dispatch, ExpenseDraft};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Home,
    Stats,
    Settings,
}

impl Screen {
    pub(crate) fn all() -> &'static [Screen] {
        &[Self::Home, Self::Stats, Self::Settings]
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Home => write!(f, "Home"),
            Self::Stats => write!(f, "Stats"),
            Self::Settings => write!(f, "Settings"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    Normal,
    Command,
    Form,
    Confirm,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Command => write!(f, "COMMAND"),
            Self::Form => write!(f, "ADD"),
            Self::Confirm => write!(f, "CONFIRM"),
        }
    }
}

/// Field with focus in the add-expense form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FormField {
    Amount,
    Category,
    Date,
    Note,
}

impl FormField {
    pub(crate) fn all() -> &'static [FormField] {
        &[Self::Amount, Self::Category, Self::Date, Self::Note]
    }

    pub(crate) fn next(self) -> Self {
        match self {
            Self::Amount => Self::Category,
            Self::Category => Self::Date,
            Self::Date => Self::Note,
            Self::Note => Self::Amount,
        }
    }

    pub(crate) fn prev(self) -> Self {
        match self {
            Self::Amount => Self::Note,
            Self::Category => Self::Amount,
            Self::Date => Self::Category,
            Self::Note => Self::Date,
        }
    }
}

impl std::fmt::Display for FormField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Amount => write!(f, "Amount (VND)"),
            Self::Category => write!(f, "Category"),
            Self::Date => write!(f, "Date"),
            Self::Note => write!(f, "Note"),
        }
    }
}

pub(crate) struct App {
    pub(crate) running: bool,
    pub(crate) screen: Screen,
    pub(crate) input_mode: InputMode,
    pub(crate) command_input: String,
    pub(crate) status_message: String,
    pub(crate) show_help: bool,

    pub(crate) state: AppState,

    // Derived from `state` after every change
    pub(crate) total: i64,
    pub(crate) utilization: u8,
    pub(crate) breakdown: Vec<CategoryTotal>,

    // Expense list cursor
    pub(crate) expense_index: usize,
    pub(crate) expense_scroll: usize,

    // Add-expense form
    pub(crate) form: ExpenseDraft,
    pub(crate) form_field: FormField,

    // Advice
    pub(crate) advice: AdviceSession,
    pub(crate) advice_text: Option<String>,
    advice_rx: Option<Receiver<String>>,
    service: Arc<dyn AdviceService>,

    // Confirmation
    pub(crate) pending_action: Option<Action>,
    pub(crate) confirm_message: String,

    // Layout (updated each render frame)
    pub(crate) visible_rows: usize,
}

impl App {
    pub(crate) fn new(state: AppState, service: Arc<dyn AdviceService>) -> Self {
        let mut app = Self {
            running: true,
            screen: Screen::Home,
            input_mode: InputMode::Normal,
            command_input: String::new(),
            status_message: String::new(),
            show_help: false,

            state,

            total: 0,
            utilization: 0,
            breakdown: Vec::new(),

            expense_index: 0,
            expense_scroll: 0,

            form: ExpenseDraft::new(Local::now().date_naive()),
            form_field: FormField::Amount,

            advice: AdviceSession::default(),
            advice_text: None,
            advice_rx: None,
            service,

            pending_action: None,
            confirm_message: String::new(),

            visible_rows: 20,
        };
        app.refresh_derived();
        app
    }

    pub(crate) fn refresh_derived(&mut self) {
        self.total = analytics::total_spend(&self.state.expenses);
        self.utilization = analytics::budget_utilization(self.total, self.state.budget);
        self.breakdown = analytics::category_breakdown(&self.state.expenses, Category::all());
        if self.expense_index >= self.state.expenses.len() {
            self.expense_index = self.state.expenses.len().saturating_sub(1);
        }
        if self.expense_scroll > self.expense_index {
            self.expense_scroll = self.expense_index;
        }
    }

    pub(crate) fn selected_expense(&self) -> Option<&Expense> {
        self.state.expenses.get(self.expense_index)
    }

    /// Run `action` now if it needs no confirmation, otherwise park it behind
    /// the confirm modal. Deleting an unknown id fails without asking.
    pub(crate) fn request(&mut self, action: Action, db: &mut Database) {
        let unknown_id =
            matches!(&action, Action::DeleteExpense(id) if self.state.find(id).is_none());
        match action.confirmation_prompt() {
            Some(prompt) if !unknown_id => {
                self.confirm_message = prompt;
                self.pending_action = Some(action);
                self.input_mode = InputMode::Confirm;
            }
            _ => self.apply(action, true, db),
        }
    }

    /// Settle the parked action with the user's answer.
    pub(crate) fn resolve_pending(&mut self, answer: bool, db: &mut Database) {
        self.input_mode = InputMode::Normal;
        self.confirm_message.clear();
        if let Some(action) = self.pending_action.take() {
            self.apply(action, answer, db);
        }
    }

    /// Reduce, persist, and report. Validation errors only reach the status bar.
    pub(crate) fn apply(&mut self, action: Action, answer: bool, db: &mut Database) {
        let done = describe(&action);
        match dispatch(&self.state, action, &mut Answered(answer)) {
            Ok(Dispatch::Applied(next)) => {
                self.state = next;
                self.refresh_derived();
                if let Err(e) = db.persist(&self.state) {
                    tracing::error!(error = %e, "failed to save state");
                    self.set_status(format!("Failed to save: {e}"));
                } else {
                    self.set_status(done);
                }
            }
            Ok(Dispatch::Declined) => self.set_status("Cancelled"),
            Err(e) => self.set_status(e.to_string()),
        }
    }

    pub(crate) fn open_form(&mut self) {
        self.form = ExpenseDraft::new(Local::now().date_naive());
        self.form_field = FormField::Amount;
        self.input_mode = InputMode::Form;
    }

    pub(crate) fn close_form(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    /// Text buffer for the focused field. The category field has none.
    pub(crate) fn form_buffer(&mut self) -> Option<&mut String> {
        match self.form_field {
            FormField::Amount => Some(&mut self.form.amount),
            FormField::Date => Some(&mut self.form.date),
            FormField::Note => Some(&mut self.form.note),
            FormField::Category => None,
        }
    }

    pub(crate) fn cycle_form_category(&mut self, delta: i32) {
        self.form.category = self.form.category.cycle(delta);
    }

    /// Validate the form. On error the form stays open with the message shown.
    pub(crate) fn submit_form(&mut self, db: &mut Database) {
        match self
            .form
            .validate(&self.state.expenses, Utc::now().timestamp_millis())
        {
            Ok(expense) => {
                self.close_form();
                self.expense_index = 0;
                self.expense_scroll = 0;
                self.apply(Action::AddExpense(expense), true, db);
            }
            Err(e) => self.set_status(e.to_string()),
        }
    }

    /// Start an advice request on a snapshot of the current state.
    pub(crate) fn start_advice(&mut self) {
        if let Err(e) = self.advice.begin() {
            self.set_status(e.to_string());
            return;
        }
        self.advice_rx = Some(advice::spawn_request(
            self.state.expenses.clone(),
            self.state.budget,
            Arc::clone(&self.service),
        ));
        self.set_status("Analyzing spending...");
    }

    /// Pick up a finished advice request, if any. Called once per event-loop tick.
    pub(crate) fn poll_advice(&mut self) {
        let Some(rx) = &self.advice_rx else {
            return;
        };
        let text = match rx.try_recv() {
            Ok(text) => text,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => advice::SERVICE_ERROR.to_string(),
        };
        self.advice_rx = None;
        self.advice.finish();
        self.advice_text = Some(text);
        self.set_status("Advice ready");
    }

    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }
}

fn describe(action: &Action) -> String {
    match action {
        Action::AddExpense(e) => format!(
            "Added {} {}",
            crate::format::format_vnd(e.amount),
            e.category
        ),
        Action::DeleteExpense(id) => format!("Deleted expense {id}"),
        Action::ResetAll => "All expenses cleared".into(),
        Action::SetBudget(limit) => format!("Budget set to {}", crate::format::format_vnd(*limit)),
    }
}
