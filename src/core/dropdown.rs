use serde::Serialize;
use std::collections::BTreeMap;

pub const DEFAULT_PLACEHOLDER: &str = "Select an option";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    /// `data-*` 屬性
    pub data: BTreeMap<String, String>,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            data: BTreeMap::new(),
        }
    }

    pub fn with_data(mut self, key: &str, value: impl Into<String>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }

    pub fn data(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }
}

/// A `<select>`: placeholder first, then options, plus disabled/selected state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dropdown {
    id: String,
    placeholder: String,
    options: Vec<SelectOption>,
    disabled: bool,
    selected: Option<usize>,
}

impl Dropdown {
    /// Starts disabled with only a placeholder.
    pub fn new(id: impl Into<String>, placeholder: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            placeholder: placeholder.into(),
            options: Vec::new(),
            disabled: true,
            selected: None,
        }
    }

    /// Clears to a single placeholder and disables.
    pub fn reset(&mut self, placeholder: &str) {
        self.placeholder = placeholder.to_string();
        self.options.clear();
        self.selected = None;
        self.disabled = true;
    }

    /// Clears existing options before appending, so repeated calls never duplicate.
    pub fn populate(&mut self, placeholder: &str, options: Vec<SelectOption>) {
        self.placeholder = placeholder.to_string();
        self.options = options;
        self.selected = None;
        self.disabled = false;
        tracing::debug!(
            "Populated dropdown '{}' with {} options",
            self.id,
            self.options.len()
        );
    }

    /// Selects by option value. An empty value selects the placeholder.
    /// Returns false when disabled or when the value is not an option.
    pub fn select(&mut self, value: &str) -> bool {
        if self.disabled {
            tracing::warn!("Ignoring selection on disabled dropdown '{}'", self.id);
            return false;
        }
        if value.is_empty() {
            self.selected = None;
            return true;
        }
        match self.options.iter().position(|opt| opt.value == value) {
            Some(index) => {
                self.selected = Some(index);
                true
            }
            None => {
                tracing::warn!("Dropdown '{}' has no option '{}'", self.id, value);
                false
            }
        }
    }

    /// Drops the selection even while disabled.
    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected_option(&self) -> Option<&SelectOption> {
        self.selected.and_then(|index| self.options.get(index))
    }

    /// Selected value, `""` when the placeholder is selected.
    pub fn selected_value(&self) -> &str {
        self.selected_option()
            .map(|opt| opt.value.as_str())
            .unwrap_or("")
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(n: usize) -> Vec<SelectOption> {
        (1..=n)
            .map(|i| SelectOption::new(i.to_string(), format!("Option {}", i)))
            .collect()
    }

    #[test]
    fn test_populate_twice_does_not_duplicate() {
        let mut dropdown = Dropdown::new("zone", DEFAULT_PLACEHOLDER);
        dropdown.populate(DEFAULT_PLACEHOLDER, options(3));
        dropdown.populate(DEFAULT_PLACEHOLDER, options(3));
        assert_eq!(dropdown.options().len(), 3);
        assert!(!dropdown.is_disabled());
    }

    #[test]
    fn test_disabled_dropdown_rejects_selection() {
        let mut dropdown = Dropdown::new("uses", "Select Zone first");
        assert!(!dropdown.select("1"));
        assert_eq!(dropdown.selected_value(), "");
    }

    #[test]
    fn test_reset_clears_selection_and_disables() {
        let mut dropdown = Dropdown::new("uses", "Select Zone first");
        dropdown.populate(DEFAULT_PLACEHOLDER, options(2));
        assert!(dropdown.select("2"));
        assert_eq!(dropdown.selected_option().unwrap().label, "Option 2");

        dropdown.reset("Select Zone first");
        assert!(dropdown.is_disabled());
        assert!(dropdown.options().is_empty());
        assert_eq!(dropdown.selected_value(), "");
        assert_eq!(dropdown.placeholder(), "Select Zone first");
    }

    #[test]
    fn test_unknown_value_keeps_previous_selection() {
        let mut dropdown = Dropdown::new("zone", DEFAULT_PLACEHOLDER);
        dropdown.populate(DEFAULT_PLACEHOLDER, options(2));
        dropdown.select("1");
        assert!(!dropdown.select("7"));
        assert_eq!(dropdown.selected_value(), "1");
    }
}
