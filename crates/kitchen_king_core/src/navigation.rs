//! crates/kitchen_king_core/src/navigation.rs
//!
//! Which screen the app is on. Kept apart from the analysis lifecycle so the two
//! can change (and be tested) independently.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Home,
    Analysis,
    Saved,
}

/// What a `go_home` transition asks the caller to do besides switching views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeEffect {
    None,
    /// The current analysis should be discarded.
    ResetAnalysis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigator {
    view: View,
}

impl Default for Navigator {
    fn default() -> Self {
        Self { view: View::Home }
    }
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> View {
        self.view
    }

    /// A new analysis result arrived.
    pub fn show_analysis(&mut self) -> View {
        self.view = View::Analysis;
        self.view
    }

    pub fn open_saved(&mut self) -> View {
        self.view = View::Saved;
        self.view
    }

    /// Leaving the saved list returns to the analysis only if one exists.
    pub fn back_from_saved(&mut self, has_analysis: bool) -> View {
        self.view = if has_analysis { View::Analysis } else { View::Home };
        self.view
    }

    pub fn go_home(&mut self, has_analysis: bool) -> HomeEffect {
        self.view = View::Home;
        if has_analysis {
            HomeEffect::ResetAnalysis
        } else {
            HomeEffect::None
        }
    }

    pub fn reset(&mut self) {
        self.view = View::Home;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_home() {
        assert_eq!(Navigator::new().view(), View::Home);
    }

    #[test]
    fn back_from_saved_depends_on_analysis() {
        let mut nav = Navigator::new();
        nav.open_saved();
        assert_eq!(nav.back_from_saved(false), View::Home);

        nav.show_analysis();
        nav.open_saved();
        assert_eq!(nav.back_from_saved(true), View::Analysis);
    }

    #[test]
    fn going_home_with_an_analysis_asks_for_reset() {
        let mut nav = Navigator::new();
        nav.show_analysis();
        assert_eq!(nav.go_home(true), HomeEffect::ResetAnalysis);
        assert_eq!(nav.view(), View::Home);
        assert_eq!(nav.go_home(false), HomeEffect::None);
    }
}
