//! Shell state: which view is showing and the settings voice commands can flip.
//!
//! One enumerated [`View`] replaces a family of per-mode booleans, so at most
//! one view is ever current.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum View {
    #[default]
    Standard,
    Scientific,
    History,
    DateCalculator,
    CurrencyConverter,
    LengthConverter,
    VolumeConverter,
    TemperatureConverter,
    AreaConverter,
    TimeConverter,
    Graphing,
    About,
}

impl View {
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            View::Standard => "Standard",
            View::Scientific => "Scientific",
            View::History => "History",
            View::DateCalculator => "Date Calculator",
            View::CurrencyConverter => "Currency Converter",
            View::LengthConverter => "Length Converter",
            View::VolumeConverter => "Volume Converter",
            View::TemperatureConverter => "Temperature Converter",
            View::AreaConverter => "Area Converter",
            View::TimeConverter => "Time Converter",
            View::Graphing => "Graphing",
            View::About => "About",
        }
    }

    /// Whether keypad shortcuts reach the calculator in this view.
    #[must_use]
    pub fn accepts_keypad(self) -> bool {
        matches!(self, View::Standard | View::Scientific | View::Graphing)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }
}

/// A setting flip requested by voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingChange {
    Theme(Theme),
    OpenMenu,
    ToggleMenu,
    CloseMenu,
    /// Ask the shell to pick a new background. The shell owns the picker.
    ChangeBackground,
}

/// Which history entries an export should contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistorySelection {
    All,
    /// The `n` most recent entries.
    Last(usize),
    /// The single entry at 1-based presentation ordinal `n`.
    Item(usize),
}

/// Informational voice queries answered without arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Announcement {
    CurrentDate,
    CurrentTime,
    HistoryCount,
}

/// Everything about the surrounding shell that routing depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShellState {
    pub view: View,
    pub sidebar_open: bool,
    pub theme: Theme,
}

impl ShellState {
    #[must_use]
    pub fn with_view(view: View) -> Self {
        Self {
            view,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_active(&self, view: View) -> bool {
        self.view == view
    }

    pub fn apply_setting(&mut self, change: SettingChange) {
        match change {
            SettingChange::Theme(theme) => self.theme = theme,
            SettingChange::OpenMenu => self.sidebar_open = true,
            SettingChange::ToggleMenu => self.sidebar_open = !self.sidebar_open,
            SettingChange::CloseMenu => self.sidebar_open = false,
            SettingChange::ChangeBackground => {}
        }
    }

    /// Switching views always closes the sidebar.
    pub fn navigate(&mut self, view: View) {
        self.view = view;
        self.sidebar_open = false;
    }
}
