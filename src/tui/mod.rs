mod ui;
mod widgets;

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::compare::Comparison;
use crate::curriculum::ComponentKind;
use crate::engine::DatabaseRegistry;
use crate::error::ExerciseError;
use crate::lifecycle::{self, Submission, Tutor};
use crate::models::{ExerciseInstance, Stats};
use crate::store::ProgressStore;
use crate::tree::{ContentTree, Tab};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Dashboard,
    Tree,
    Component,
}

impl View {
    fn next(&self) -> Self {
        match self {
            View::Dashboard => View::Tree,
            View::Tree => View::Dashboard,
            View::Component => View::Tree,
        }
    }

    fn prev(&self) -> Self {
        match self {
            View::Dashboard => View::Tree,
            View::Tree => View::Dashboard,
            View::Component => View::Tree,
        }
    }
}

pub struct StatefulList<T> {
    pub items: Vec<T>,
    pub selected: Option<usize>,
}

impl<T> StatefulList<T> {
    fn with_items(items: Vec<T>) -> Self {
        let selected = if items.is_empty() { None } else { Some(0) };
        Self { items, selected }
    }

    fn next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.selected {
            Some(i) if i + 1 < self.items.len() => i + 1,
            _ => 0,
        };
        self.selected = Some(i);
    }

    fn previous(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.selected {
            Some(0) | None => self.items.len() - 1,
            Some(i) => i - 1,
        };
        self.selected = Some(i);
    }

    fn first(&mut self) {
        if !self.items.is_empty() {
            self.selected = Some(0);
        }
    }

    fn last(&mut self) {
        if !self.items.is_empty() {
            self.selected = Some(self.items.len() - 1);
        }
    }

    fn selected_item(&self) -> Option<&T> {
        self.selected.and_then(|i| self.items.get(i))
    }
}

// One curriculum component as listed in the tree view
#[derive(Debug, Clone)]
pub struct TreeRow {
    pub id: &'static str,
    pub name: &'static str,
    pub kind: ComponentKind,
    pub unlocked: bool,
    pub complete: bool,
    pub num_solved: u32,
}

#[derive(Debug, Clone)]
pub struct Feedback {
    pub correct: bool,
    pub text: String,
    pub comparison: Option<Comparison>,
}

pub struct App {
    store: ProgressStore,
    databases: DatabaseRegistry,
    pub tree: ContentTree,
    pub view: View,
    pub rows: StatefulList<TreeRow>,
    pub stats: Stats,
    pub next_up: Option<&'static str>,
    pub engine_error: Option<String>,
    pub component: Option<&'static str>,
    pub tabs: Vec<Tab>,
    pub tab: usize,
    pub exercise: Option<ExerciseInstance>,
    pub task: String,
    pub hints_shown: usize,
    pub input: String,
    pub input_mode: bool,
    pub feedback: Option<Feedback>,
    pub solution: Option<String>,
    pub status: Option<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new(
        store: ProgressStore,
        databases: DatabaseRegistry,
        tree: ContentTree,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let engine_error = databases.initialize().err().map(|e| e.to_string());
        let stats = store.get_stats()?;

        let mut app = Self {
            store,
            databases,
            tree,
            view: View::Dashboard,
            rows: StatefulList::with_items(Vec::new()),
            stats,
            next_up: None,
            engine_error,
            component: None,
            tabs: Vec::new(),
            tab: 0,
            exercise: None,
            task: String::new(),
            hints_shown: 0,
            input: String::new(),
            input_mode: false,
            feedback: None,
            solution: None,
            status: None,
            should_quit: false,
        };
        app.refresh_data()?;
        Ok(app)
    }

    pub fn refresh_data(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let selected = self.rows.selected;
        let mut rows = Vec::with_capacity(self.tree.components().len());
        let mut complete = std::collections::HashSet::new();

        for def in self.tree.components() {
            let (done, num_solved) = match def.kind {
                ComponentKind::Skill => {
                    let progress = self.store.load_skill(def.id)?;
                    (progress.is_mastered(), progress.num_solved)
                }
                ComponentKind::Concept => (self.store.load_concept(def.id)?.understood, 0),
            };
            if done {
                complete.insert(def.id);
            }
            rows.push(TreeRow {
                id: def.id,
                name: def.name,
                kind: def.kind,
                unlocked: false,
                complete: done,
                num_solved,
            });
        }

        for row in &mut rows {
            row.unlocked = self.tree.is_unlocked(row.id, |id| complete.contains(id));
        }

        self.next_up = self.tree.next_up(|id| complete.contains(id)).map(|c| c.id);
        self.stats = self.store.get_stats()?;
        self.rows = StatefulList::with_items(rows);
        if let Some(i) = selected {
            if i < self.rows.items.len() {
                self.rows.selected = Some(i);
            }
        }
        Ok(())
    }

    pub fn current_tab(&self) -> Option<Tab> {
        self.tabs.get(self.tab).copied()
    }

    pub fn hints(&self) -> &'static [&'static str] {
        match self.component {
            Some(id) => crate::exercises::descriptor(id).map(|d| d.hints).unwrap_or(&[]),
            None => &[],
        }
    }

    fn tutor(&self) -> Tutor<'_> {
        Tutor::new(&self.store, &self.databases)
    }

    fn open_component(&mut self, id: &'static str) -> Result<(), Box<dyn std::error::Error>> {
        self.component = Some(id);
        self.tabs = self.tree.tabs(id);
        self.tab = 0;
        self.clear_exercise_state();
        self.view = View::Component;
        Ok(())
    }

    fn open_selected(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(row) = self.rows.selected_item() {
            let id = row.id;
            self.open_component(id)?;
        }
        Ok(())
    }

    fn open_next_up(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(id) = self.next_up {
            if let Some(i) = self.rows.items.iter().position(|r| r.id == id) {
                self.rows.selected = Some(i);
            }
            self.open_component(id)?;
        }
        Ok(())
    }

    fn clear_exercise_state(&mut self) {
        self.exercise = None;
        self.task.clear();
        self.hints_shown = 0;
        self.input.clear();
        self.input_mode = false;
        self.feedback = None;
        self.solution = None;
        self.status = None;
    }

    fn close_component(&mut self) {
        self.view = View::Tree;
        self.component = None;
        self.tabs.clear();
        self.clear_exercise_state();
    }

    fn switch_tab(&mut self, forward: bool) -> Result<(), Box<dyn std::error::Error>> {
        if self.tabs.is_empty() {
            return Ok(());
        }
        self.tab = if forward {
            (self.tab + 1) % self.tabs.len()
        } else {
            (self.tab + self.tabs.len() - 1) % self.tabs.len()
        };
        if self.current_tab() == Some(Tab::Exercises) && self.exercise.is_none() {
            self.start_exercise()?;
        }
        Ok(())
    }

    fn show_exercise(&mut self, instance: ExerciseInstance) -> Result<(), ExerciseError> {
        self.task = self.tutor().describe(&instance)?;
        self.exercise = Some(instance);
        self.hints_shown = 0;
        self.input.clear();
        self.feedback = None;
        self.solution = None;
        Ok(())
    }

    fn start_exercise(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let Some(id) = self.component else {
            return Ok(());
        };
        let instance = self.tutor().start(id)?;
        self.show_exercise(instance)?;
        Ok(())
    }

    fn new_exercise(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let Some(id) = self.component else {
            return Ok(());
        };
        let instance = self.tutor().request_new(id)?;
        self.show_exercise(instance)?;
        self.status = Some("New exercise generated.".to_string());
        Ok(())
    }

    fn submit(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let Some(id) = self.component else {
            return Ok(());
        };
        let input = self.input.trim().to_string();
        if input.is_empty() {
            self.feedback = Some(Feedback {
                correct: false,
                text: "Type a query first.".to_string(),
                comparison: None,
            });
            return Ok(());
        }

        let submission = self.tutor().submit_input(id, &input)?;
        match submission {
            Submission::Judged(judgement) => {
                let correct = judgement.attempt.status == crate::models::InstanceStatus::Correct;
                let mut text = judgement.attempt.feedback.unwrap_or_default();
                if correct && judgement.mastered {
                    text.push_str(" Skill mastered.");
                }
                self.feedback = Some(Feedback {
                    correct,
                    text,
                    comparison: judgement.comparison,
                });
                if let Some(exercise) = &mut self.exercise {
                    exercise.status = judgement.status;
                }
                self.refresh_data()?;
            }
            Submission::Regenerated(instance) => {
                self.show_exercise(instance)?;
                self.status = Some("This exercise was outdated and has been replaced.".to_string());
            }
        }
        Ok(())
    }

    fn give_up(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let Some(id) = self.component else {
            return Ok(());
        };
        let solution = self.tutor().give_up(id)?;
        self.solution = Some(solution);
        Ok(())
    }

    fn reveal_hint(&mut self) {
        if self.hints_shown < self.hints().len() {
            self.hints_shown += 1;
        }
    }

    fn toggle_understood(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let Some(id) = self.component else {
            return Ok(());
        };
        let understood = !self.store.load_concept(id)?.understood;
        self.store.set_understood(id, understood)?;
        self.status = Some(if understood {
            "Marked as understood.".to_string()
        } else {
            "Marked as not understood.".to_string()
        });
        self.refresh_data()
    }

    fn reset_sandbox(&mut self) {
        let Some(id) = self.component else {
            return;
        };
        self.status = Some(match lifecycle::reset_sandbox(&self.databases, id) {
            Ok(_) => "Database reset to its original contents.".to_string(),
            Err(e) => e.to_string(),
        });
    }

    pub fn is_understood(&self, id: &str) -> bool {
        self.rows
            .items
            .iter()
            .any(|r| r.id == id && r.kind == ComponentKind::Concept && r.complete)
    }

    fn handle_key(
        &mut self,
        key: KeyCode,
        modifiers: KeyModifiers,
    ) -> Result<(), Box<dyn std::error::Error>> {
        // Query input mode
        if self.input_mode {
            match key {
                KeyCode::Esc => {
                    self.input_mode = false;
                }
                KeyCode::Enter => {
                    self.input_mode = false;
                    self.submit()?;
                }
                KeyCode::Backspace => {
                    self.input.pop();
                }
                KeyCode::Char(c) => {
                    self.input.push(c);
                }
                _ => {}
            }
            return Ok(());
        }

        let on_exercise = self.view == View::Component && self.current_tab() == Some(Tab::Exercises);
        let on_concept = self.view == View::Component
            && self
                .component
                .and_then(|id| self.tree.get(id))
                .is_some_and(|c| c.kind == ComponentKind::Concept);

        match key {
            KeyCode::Char('q') => self.should_quit = true,

            KeyCode::Char('r') if modifiers.contains(KeyModifiers::CONTROL) => {
                self.refresh_data()?;
            }

            KeyCode::Esc if self.view == View::Component => self.close_component(),

            KeyCode::Char('h') | KeyCode::Left => match self.view {
                View::Component => self.close_component(),
                _ => self.view = self.view.prev(),
            },
            KeyCode::Char('l') | KeyCode::Right => match self.view {
                View::Tree => self.open_selected()?,
                View::Component => {}
                _ => self.view = self.view.next(),
            },
            KeyCode::Tab | KeyCode::BackTab if self.view != View::Component => {
                self.view = self.view.next();
            }

            KeyCode::Char('j') | KeyCode::Down if self.view == View::Tree => self.rows.next(),
            KeyCode::Char('k') | KeyCode::Up if self.view == View::Tree => self.rows.previous(),
            KeyCode::Char('g') if self.view == View::Tree => self.rows.first(),
            KeyCode::Char('G') if self.view == View::Tree => self.rows.last(),

            KeyCode::Enter => match self.view {
                View::Tree => self.open_selected()?,
                View::Dashboard => self.open_next_up()?,
                View::Component => {}
            },

            KeyCode::Char(']') | KeyCode::Tab if self.view == View::Component => {
                self.switch_tab(true)?
            }
            KeyCode::Char('[') | KeyCode::BackTab if self.view == View::Component => {
                self.switch_tab(false)?
            }

            KeyCode::Char('i') if on_exercise && self.exercise.is_some() => {
                self.input_mode = true;
                self.status = None;
            }
            KeyCode::Char('n') if on_exercise => self.new_exercise()?,
            KeyCode::Char('s') if on_exercise && self.exercise.is_some() => self.give_up()?,
            KeyCode::Char('?') if on_exercise => self.reveal_hint(),
            KeyCode::Char('R') if on_exercise => self.reset_sandbox(),
            KeyCode::Char('u') if on_concept => self.toggle_understood()?,

            _ => {}
        }
        Ok(())
    }
}

pub fn run(
    store: ProgressStore,
    databases: DatabaseRegistry,
    tree: ContentTree,
) -> Result<(), Box<dyn std::error::Error>> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = App::new(store, databases, tree).and_then(|mut app| run_app(&mut terminal, &mut app));

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                // Errors are shown in the status line rather than ending the session
                if let Err(e) = app.handle_key(key.code, key.modifiers) {
                    app.status = Some(format!("Error: {}", e));
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
