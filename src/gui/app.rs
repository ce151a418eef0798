use egui::{Color32, RichText, ScrollArea, TextEdit};
use nix::unistd::Pid;
use proc_name::{LookupError, NativeQuery, ProcessName, ProcessNameLookup};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// What the last lookup of a pid returned
#[derive(Debug, Clone, PartialEq)]
enum Outcome {
    Found(String),
    EmptyName,
    NotFound,
    OutOfMemory,
}

impl From<Result<ProcessName, LookupError>> for Outcome {
    fn from(result: Result<ProcessName, LookupError>) -> Self {
        match result {
            Ok(name) => Outcome::Found(name.to_string_lossy()),
            Err(LookupError::EmptyName(_)) => Outcome::EmptyName,
            Err(LookupError::NotFound(_)) => Outcome::NotFound,
            Err(LookupError::AllocationFailure(_)) => Outcome::OutOfMemory,
        }
    }
}

impl Outcome {
    fn label(&self) -> &'static str {
        match self {
            Outcome::Found(_) => "Running",
            Outcome::EmptyName => "Empty name",
            Outcome::NotFound => "Not found",
            Outcome::OutOfMemory => "Out of memory",
        }
    }

    fn color(&self) -> Color32 {
        match self {
            Outcome::Found(_) => Color32::GREEN,
            Outcome::EmptyName => Color32::YELLOW,
            Outcome::NotFound => Color32::GRAY,
            Outcome::OutOfMemory => Color32::RED,
        }
    }

    fn name(&self) -> &str {
        match self {
            Outcome::Found(name) => name,
            _ => "",
        }
    }
}

/// One row of the lookup table
#[derive(Debug, Clone)]
struct LookupEntry {
    pid: Pid,
    outcome: Outcome,
}

#[derive(Clone, Copy, PartialEq)]
enum SortColumn {
    Pid,
    Name,
}

/// Main application state for the lookup viewer
pub struct ProcessNameApp {
    lookup: ProcessNameLookup<NativeQuery>,
    entries: Vec<LookupEntry>,
    filtered_entries: Vec<usize>, // Indices into entries vec
    search_filter: String,
    sort_column: SortColumn,
    sort_ascending: bool,
    last_refresh: Instant,
    refresh_interval: Duration,
    pid_input: String,
    error_message: Option<String>,
    success_message: Option<String>,
    auto_refresh: bool,
}

impl Default for ProcessNameApp {
    fn default() -> Self {
        Self {
            lookup: ProcessNameLookup::new(NativeQuery::default()),
            entries: Vec::new(),
            filtered_entries: Vec::new(),
            search_filter: String::new(),
            sort_column: SortColumn::Pid,
            sort_ascending: true,
            last_refresh: Instant::now(),
            refresh_interval: Duration::from_secs(2),
            pid_input: String::new(),
            error_message: None,
            success_message: None,
            auto_refresh: true,
        }
    }
}

impl ProcessNameApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let mut app = Self::default();
        app.look_up(Pid::this());
        app
    }

    /// Look up a pid and insert or update its row
    fn look_up(&mut self, pid: Pid) {
        let outcome = Outcome::from(self.lookup.lookup(pid));
        info!(%pid, outcome = outcome.label(), name = outcome.name(), "looked up process");

        self.success_message = match &outcome {
            Outcome::Found(name) => Some(format!("PID {} is {}", pid, name)),
            _ => None,
        };
        self.error_message = match &outcome {
            Outcome::Found(_) => None,
            other => Some(format!("PID {}: {}", pid, other.label())),
        };

        match self.entries.iter_mut().find(|e| e.pid == pid) {
            Some(entry) => entry.outcome = outcome,
            None => self.entries.push(LookupEntry { pid, outcome }),
        }
        self.apply_filters_and_sort();
    }

    /// Parse the pid input field and look it up
    fn look_up_input(&mut self) {
        match self.pid_input.trim().parse::<i32>() {
            Ok(raw) => {
                self.look_up(Pid::from_raw(raw));
                self.pid_input.clear();
            }
            Err(_) => {
                self.success_message = None;
                self.error_message = Some(format!("Invalid PID: {:?}", self.pid_input));
            }
        }
    }

    /// Re-run the lookup for every row, processes may have exited since
    fn refresh_entries(&mut self) {
        for entry in &mut self.entries {
            entry.outcome = Outcome::from(self.lookup.lookup(entry.pid));
        }
        debug!(rows = self.entries.len(), "refreshed lookups");
        self.apply_filters_and_sort();
        self.last_refresh = Instant::now();
    }

    /// Apply search filter and sorting
    fn apply_filters_and_sort(&mut self) {
        let filter_lower = self.search_filter.to_lowercase();
        self.filtered_entries = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| {
                filter_lower.is_empty()
                    || e.outcome.name().to_lowercase().contains(&filter_lower)
                    || e.pid.to_string().contains(&filter_lower)
            })
            .map(|(idx, _)| idx)
            .collect();

        let entries = &self.entries;
        let sort_column = self.sort_column;
        let sort_ascending = self.sort_ascending;
        self.filtered_entries.sort_by(|&a, &b| {
            let cmp = match sort_column {
                SortColumn::Pid => entries[a].pid.cmp(&entries[b].pid),
                SortColumn::Name => entries[a].outcome.name().cmp(entries[b].outcome.name()),
            };

            if sort_ascending {
                cmp
            } else {
                cmp.reverse()
            }
        });
    }

    fn sort_by(&mut self, column: SortColumn) {
        if self.sort_column == column {
            self.sort_ascending = !self.sort_ascending;
        } else {
            self.sort_column = column;
            self.sort_ascending = true;
        }
        self.apply_filters_and_sort();
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.filtered_entries.clear();
        self.error_message = None;
        self.success_message = None;
    }
}

impl eframe::App for ProcessNameApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Auto-refresh logic
        if self.auto_refresh && self.last_refresh.elapsed() >= self.refresh_interval {
            self.refresh_entries();
        }

        if self.auto_refresh {
            ctx.request_repaint_after(self.refresh_interval);
        }

        // Top menu bar
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Refresh").clicked() {
                        self.refresh_entries();
                    }
                    if ui.button("Clear").clicked() {
                        self.clear();
                    }
                    if ui.button("Exit").clicked() {
                        std::process::exit(0);
                    }
                });

                ui.menu_button("View", |ui| {
                    ui.checkbox(&mut self.auto_refresh, "Auto Refresh");
                    ui.separator();
                    if ui.button("Sort by PID").clicked() {
                        self.sort_by(SortColumn::Pid);
                    }
                    if ui.button("Sort by Name").clicked() {
                        self.sort_by(SortColumn::Name);
                    }
                });
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(error) = &self.error_message {
                ui.colored_label(Color32::RED, format!("Error: {}", error));
            }
            if let Some(success) = &self.success_message {
                ui.colored_label(Color32::GREEN, format!("Success: {}", success));
            }

            ui.horizontal(|ui| {
                ui.label("PID:");
                let input = ui.add(
                    TextEdit::singleline(&mut self.pid_input)
                        .desired_width(80.0)
                        .hint_text("e.g. 1"),
                );
                let entered = input.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                if ui.button("Look Up").clicked() || entered {
                    self.look_up_input();
                }
                if ui.button("Look Up Self").clicked() {
                    self.look_up(Pid::this());
                }
            });

            ui.horizontal(|ui| {
                ui.label("Search:");
                if ui
                    .add(TextEdit::singleline(&mut self.search_filter).hint_text("name or pid"))
                    .changed()
                {
                    self.apply_filters_and_sort();
                }
            });

            ui.separator();

            ScrollArea::vertical().show(ui, |ui| {
                egui::Grid::new("lookup_table")
                    .num_columns(3)
                    .striped(true)
                    .show(ui, |ui| {
                        if ui.button(RichText::new("PID").strong()).clicked() {
                            self.sort_by(SortColumn::Pid);
                        }
                        ui.label(RichText::new("Status").strong());
                        if ui.button(RichText::new("Name").strong()).clicked() {
                            self.sort_by(SortColumn::Name);
                        }
                        ui.end_row();

                        for &idx in &self.filtered_entries {
                            let entry = &self.entries[idx];
                            ui.label(entry.pid.to_string());
                            ui.colored_label(entry.outcome.color(), entry.outcome.label());
                            ui.label(entry.outcome.name());
                            ui.end_row();
                        }
                    });
            });
        });
    }
}
