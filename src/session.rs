// Per-session interactive state: the two selectors and the intro dialog
// flag. Owned by the CLI loop and passed down explicitly.

#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub year: i32,
    pub region: String,
}

#[derive(Debug, Clone)]
pub struct SessionState {
    pub selection: Selection,
    /// True until the user dismisses the intro dialog.
    pub show_info: bool,
}

impl SessionState {
    /// Start on the most recent year and the first region alphabetically.
    /// `years` and `regions` are expected sorted ascending; `None` if either
    /// is empty.
    pub fn new(years: &[i32], regions: &[String]) -> Option<Self> {
        let year = *years.last()?;
        let region = regions.first()?.clone();
        Some(Self {
            selection: Selection { year, region },
            show_info: true,
        })
    }

    /// Returns `false` and leaves the selection untouched if `year` is not
    /// one of the offered years.
    pub fn select_year(&mut self, years: &[i32], year: i32) -> bool {
        if !years.contains(&year) {
            return false;
        }
        self.selection.year = year;
        true
    }

    pub fn select_region(&mut self, regions: &[String], region: &str) -> bool {
        if !regions.iter().any(|r| r == region) {
            return false;
        }
        self.selection.region = region.to_string();
        true
    }

    pub fn dismiss_info(&mut self) {
        self.show_info = false;
    }
}
