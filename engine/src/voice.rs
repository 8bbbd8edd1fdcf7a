//! Voice commands that control the shell instead of computing.
//!
//! Rules run in a fixed order and the first one that fires wins. They are
//! checked before any arithmetic so that "close history" is never read as an
//! expression. Keywords match whole words: "times" does not open the time
//! converter.

use std::sync::OnceLock;

use regex::Regex;
use voxcalc_core::words_to_digits;
use voxcalc_types::{
    Announcement, HistorySelection, RouterAction, SettingChange, ShellState, Theme, View,
};

/// A lowercased, trimmed utterance.
#[derive(Debug, Clone, Copy)]
pub struct Utterance<'a> {
    text: &'a str,
}

impl<'a> Utterance<'a> {
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        Self { text }
    }

    #[must_use]
    pub fn text(self) -> &'a str {
        self.text
    }

    /// Whether `needle` occurs with no letter or digit on either side.
    #[must_use]
    pub fn mentions(self, needle: &str) -> bool {
        self.text.match_indices(needle).any(|(start, matched)| {
            let before = self.text[..start].chars().next_back();
            let after = self.text[start + matched.len()..].chars().next();
            !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
        })
    }

    #[must_use]
    pub fn mentions_any(self, needles: &[&str]) -> bool {
        needles.iter().any(|needle| self.mentions(needle))
    }
}

type Rule = fn(Utterance<'_>, &ShellState, usize) -> Option<RouterAction>;

/// Priority order. Earlier rules shadow later ones on overlapping keywords.
const RULES: &[(&str, Rule)] = &[
    ("download", download),
    ("date", current_date),
    ("time", current_time),
    ("count", history_count),
    ("clear-history", clear_history),
    ("history", open_history),
    ("open-view", open_view),
    ("background", change_background),
    ("standard", standard_or_close_view),
    ("scientific", scientific),
    ("theme", theme),
    ("back", go_back),
    ("menu", menu),
];

/// Views opened by name. None of these fire when the utterance says "close".
const VIEW_OPENERS: &[(View, &[&str])] = &[
    (View::DateCalculator, &["date calculator", "open date"]),
    (
        View::CurrencyConverter,
        &["currency converter", "open currency"],
    ),
    (View::LengthConverter, &["length converter", "open length"]),
    (View::VolumeConverter, &["volume converter", "open volume"]),
    (View::TemperatureConverter, &["temperature"]),
    (View::AreaConverter, &["area"]),
    (View::TimeConverter, &["time"]),
    (View::About, &["about", "who are you"]),
    (View::Graphing, &["graphing", "graph"]),
];

/// `close <word>` targets. Closing only happens while the view is showing.
const CLOSE_TARGETS: &[(View, &[&str])] = &[
    (View::History, &["history"]),
    (View::DateCalculator, &["date"]),
    (View::CurrencyConverter, &["currency"]),
    (View::LengthConverter, &["length"]),
    (View::VolumeConverter, &["volume"]),
    (View::TemperatureConverter, &["temperature"]),
    (View::AreaConverter, &["area"]),
    (View::TimeConverter, &["time"]),
    (View::Graphing, &["graphing", "graph"]),
    (View::About, &["about"]),
    (View::Scientific, &["scientific", "science", "sci"]),
];

/// Match `utterance` against the command table.
#[must_use]
pub fn match_command(
    utterance: Utterance<'_>,
    shell: &ShellState,
    history_len: usize,
) -> Option<RouterAction> {
    RULES.iter().find_map(|(name, rule)| {
        let action = rule(utterance, shell, history_len)?;
        tracing::debug!(rule = *name, ?action, "voice command matched");
        Some(action)
    })
}

/// Navigate, unless the view is already showing. Then only an open sidebar
/// needs closing.
fn switch_to(view: View, shell: &ShellState) -> RouterAction {
    if !shell.is_active(view) {
        RouterAction::Navigate(view)
    } else if shell.sidebar_open {
        RouterAction::ToggleSetting(SettingChange::CloseMenu)
    } else {
        RouterAction::NoOp
    }
}

struct DownloadPatterns {
    last: Regex,
    ordinal: Regex,
}

fn download_patterns() -> &'static DownloadPatterns {
    static PATTERNS: OnceLock<DownloadPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| DownloadPatterns {
        last: Regex::new(r"\blast\s+(\d+)").expect("valid last-n regex"),
        ordinal: Regex::new(r"(\d+)").expect("valid ordinal regex"),
    })
}

fn download(u: Utterance<'_>, _: &ShellState, history_len: usize) -> Option<RouterAction> {
    if !u.mentions("download") {
        return None;
    }
    let text = words_to_digits(u.text());
    let patterns = download_patterns();

    let selection = if let Some(caps) = patterns.last.captures(&text)
        && let Ok(n) = caps[1].parse::<usize>()
        && n > 0
    {
        HistorySelection::Last(n)
    } else if u.mentions_any(&["calculation", "item"])
        && let Some(caps) = patterns.ordinal.captures(&text)
        && let Ok(n) = caps[1].parse::<usize>()
        && (1..=history_len).contains(&n)
    {
        HistorySelection::Item(n)
    } else {
        HistorySelection::All
    };
    Some(RouterAction::ExportHistory(selection))
}

fn current_date(u: Utterance<'_>, _: &ShellState, _: usize) -> Option<RouterAction> {
    u.mentions_any(&["what date is it", "todays date", "today's date", "current date"])
        .then_some(RouterAction::Inform(Announcement::CurrentDate))
}

fn current_time(u: Utterance<'_>, _: &ShellState, _: usize) -> Option<RouterAction> {
    u.mentions_any(&["what time is it", "current time"])
        .then_some(RouterAction::Inform(Announcement::CurrentTime))
}

fn history_count(u: Utterance<'_>, _: &ShellState, _: usize) -> Option<RouterAction> {
    u.mentions_any(&["how many calculations", "history count"])
        .then_some(RouterAction::Inform(Announcement::HistoryCount))
}

fn clear_history(u: Utterance<'_>, _: &ShellState, _: usize) -> Option<RouterAction> {
    u.mentions("clear history")
        .then_some(RouterAction::ClearHistory)
}

fn open_history(u: Utterance<'_>, shell: &ShellState, _: usize) -> Option<RouterAction> {
    (u.mentions("history") && !u.mentions_any(&["close", "count", "clear"]))
        .then(|| switch_to(View::History, shell))
}

fn open_view(u: Utterance<'_>, shell: &ShellState, _: usize) -> Option<RouterAction> {
    if u.mentions("close") {
        return None;
    }
    VIEW_OPENERS
        .iter()
        .find(|(_, triggers)| u.mentions_any(triggers))
        .map(|(view, _)| switch_to(*view, shell))
}

fn change_background(u: Utterance<'_>, _: &ShellState, _: usize) -> Option<RouterAction> {
    u.mentions_any(&["change background", "change wallpaper"])
        .then_some(RouterAction::ToggleSetting(SettingChange::ChangeBackground))
}

fn standard_or_close_view(u: Utterance<'_>, shell: &ShellState, _: usize) -> Option<RouterAction> {
    if u.mentions("close")
        && let Some((view, _)) = CLOSE_TARGETS
            .iter()
            .find(|(_, words)| u.mentions_any(words))
    {
        return Some(if shell.is_active(*view) {
            RouterAction::Navigate(View::Standard)
        } else {
            RouterAction::NoOp
        });
    }
    u.mentions_any(&["standard", "normal", "basic"])
        .then(|| switch_to(View::Standard, shell))
}

fn scientific(u: Utterance<'_>, shell: &ShellState, _: usize) -> Option<RouterAction> {
    u.mentions_any(&["scientific", "science", "sci mode", "sci calculator"])
        .then(|| switch_to(View::Scientific, shell))
}

fn theme(u: Utterance<'_>, _: &ShellState, _: usize) -> Option<RouterAction> {
    if u.mentions("dark mode") {
        Some(RouterAction::ToggleSetting(SettingChange::Theme(Theme::Dark)))
    } else if u.mentions("light mode") {
        Some(RouterAction::ToggleSetting(SettingChange::Theme(Theme::Light)))
    } else {
        None
    }
}

fn go_back(u: Utterance<'_>, shell: &ShellState, _: usize) -> Option<RouterAction> {
    if !(matches!(u.text(), "close" | "go back") || u.mentions("close menu")) {
        return None;
    }
    Some(if shell.sidebar_open {
        RouterAction::ToggleSetting(SettingChange::CloseMenu)
    } else if !shell.is_active(View::Standard) {
        RouterAction::Navigate(View::Standard)
    } else {
        RouterAction::NoOp
    })
}

fn menu(u: Utterance<'_>, _: &ShellState, _: usize) -> Option<RouterAction> {
    if !u.mentions("menu") {
        return None;
    }
    Some(RouterAction::ToggleSetting(if u.mentions("toggle") {
        SettingChange::ToggleMenu
    } else {
        SettingChange::OpenMenu
    }))
}

#[cfg(test)]
mod tests {
    use voxcalc_types::{
        Announcement, HistorySelection, RouterAction, SettingChange, ShellState, Theme, View,
    };

    use super::{Utterance, match_command};

    fn run(text: &str, shell: &ShellState) -> Option<RouterAction> {
        match_command(Utterance::new(text), shell, 5)
    }

    fn standard() -> ShellState {
        ShellState::default()
    }

    #[test]
    fn mentions_respects_word_boundaries() {
        let u = Utterance::new("five times three");
        assert!(!u.mentions("time"));
        assert!(u.mentions("times"));
        assert!(Utterance::new("what time is it").mentions("time"));
        assert!(Utterance::new("time").mentions("time"));
    }

    #[test]
    fn arithmetic_is_not_a_command() {
        assert_eq!(run("five times three", &standard()), None);
        assert_eq!(run("what is fifteen percent of eighty", &standard()), None);
    }

    #[test]
    fn close_history_only_when_showing() {
        assert_eq!(run("close history", &standard()), Some(RouterAction::NoOp));
        assert_eq!(
            run("close history", &ShellState::with_view(View::History)),
            Some(RouterAction::Navigate(View::Standard))
        );
    }

    #[test]
    fn close_converter_does_not_reopen_it() {
        assert_eq!(
            run("close temperature", &ShellState::with_view(View::TemperatureConverter)),
            Some(RouterAction::Navigate(View::Standard))
        );
        assert_eq!(run("close area", &standard()), Some(RouterAction::NoOp));
    }

    #[test]
    fn openers_navigate() {
        assert_eq!(
            run("show history", &standard()),
            Some(RouterAction::Navigate(View::History))
        );
        assert_eq!(
            run("open the area converter", &standard()),
            Some(RouterAction::Navigate(View::AreaConverter))
        );
        assert_eq!(
            run("who are you", &standard()),
            Some(RouterAction::Navigate(View::About))
        );
        assert_eq!(
            run("switch to scientific", &standard()),
            Some(RouterAction::Navigate(View::Scientific))
        );
    }

    #[test]
    fn reopening_current_view_is_noop_or_closes_sidebar() {
        let mut shell = ShellState::with_view(View::Scientific);
        assert_eq!(run("scientific", &shell), Some(RouterAction::NoOp));
        shell.sidebar_open = true;
        assert_eq!(
            run("scientific", &shell),
            Some(RouterAction::ToggleSetting(SettingChange::CloseMenu))
        );
    }

    #[test]
    fn announcements() {
        assert_eq!(
            run("what date is it", &standard()),
            Some(RouterAction::Inform(Announcement::CurrentDate))
        );
        assert_eq!(
            run("what time is it", &standard()),
            Some(RouterAction::Inform(Announcement::CurrentTime))
        );
        assert_eq!(
            run("how many calculations", &standard()),
            Some(RouterAction::Inform(Announcement::HistoryCount))
        );
        assert_eq!(
            run("history count", &standard()),
            Some(RouterAction::Inform(Announcement::HistoryCount))
        );
    }

    #[test]
    fn download_selections() {
        assert_eq!(
            run("download last 3", &standard()),
            Some(RouterAction::ExportHistory(HistorySelection::Last(3)))
        );
        assert_eq!(
            run("download last three", &standard()),
            Some(RouterAction::ExportHistory(HistorySelection::Last(3)))
        );
        assert_eq!(
            run("download calculation 2", &standard()),
            Some(RouterAction::ExportHistory(HistorySelection::Item(2)))
        );
        assert_eq!(
            run("download item 9", &standard()),
            Some(RouterAction::ExportHistory(HistorySelection::All))
        );
        assert_eq!(
            run("download history", &standard()),
            Some(RouterAction::ExportHistory(HistorySelection::All))
        );
    }

    #[test]
    fn settings() {
        assert_eq!(
            run("dark mode", &standard()),
            Some(RouterAction::ToggleSetting(SettingChange::Theme(Theme::Dark)))
        );
        assert_eq!(
            run("change wallpaper", &standard()),
            Some(RouterAction::ToggleSetting(SettingChange::ChangeBackground))
        );
        assert_eq!(
            run("toggle menu", &standard()),
            Some(RouterAction::ToggleSetting(SettingChange::ToggleMenu))
        );
        assert_eq!(
            run("open menu", &standard()),
            Some(RouterAction::ToggleSetting(SettingChange::OpenMenu))
        );
        assert_eq!(run("clear history", &standard()), Some(RouterAction::ClearHistory));
    }

    #[test]
    fn go_back_prefers_closing_the_sidebar() {
        let mut shell = ShellState::with_view(View::Graphing);
        shell.sidebar_open = true;
        assert_eq!(
            run("close menu", &shell),
            Some(RouterAction::ToggleSetting(SettingChange::CloseMenu))
        );
        shell.sidebar_open = false;
        assert_eq!(
            run("go back", &shell),
            Some(RouterAction::Navigate(View::Standard))
        );
        assert_eq!(run("close", &standard()), Some(RouterAction::NoOp));
    }
}
