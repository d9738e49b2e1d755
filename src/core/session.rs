use crate::core::cascade::{
    building_type_options, lookup_options, ulb_options, update_child, zone_options, Relation,
    ZoneUsesRule,
};
use crate::core::dropdown::{Dropdown, SelectOption, DEFAULT_PLACEHOLDER};
use crate::core::feedback::FeedbackBoard;
use crate::core::rules::{self, validate_file};
use crate::core::schema::{lookup_field_name, FieldKind, FormSchema};
use crate::core::toggle::{udcpr_toggles, BoundaryControls, ConditionalToggle, Side, ToggleState};
use crate::domain::model::{Ack, FileUpload, FormPayload, ReferenceData};
use crate::utils::error::{FieldFailure, IntakeError, SubmitError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

/// 使用者在表單上的一個動作
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FormEvent {
    Input { field: String, value: String },
    Blur { field: String },
    Change { field: String, value: String },
    Radio { group: String, value: String },
    File { field: String, path: PathBuf },
    Submit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// What the browser showed as `alert()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitState {
    Idle,
    Submitting,
}

#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub zone_uses_rule: ZoneUsesRule,
    /// Prefixed to a 10-digit `contact_no` when serialising, e.g. `+91`.
    pub contact_country_code: Option<String>,
}

const PARENT_DROPDOWNS: [&str; 3] = ["ulb_rp_special_authority", "zone", "building_type"];

/// Session-scoped state of one form instance.
#[derive(Debug)]
pub struct FormSession {
    schema: FormSchema,
    options: SessionOptions,
    data: Option<Arc<ReferenceData>>,
    values: BTreeMap<String, String>,
    files: BTreeMap<String, FileUpload>,
    dropdowns: BTreeMap<String, Dropdown>,
    toggles: Vec<ConditionalToggle>,
    boundaries: BoundaryControls,
    feedback: FeedbackBoard,
    notices: Vec<Notice>,
    busy: bool,
    state: SubmitState,
}

impl FormSession {
    pub fn new(schema: FormSchema, options: SessionOptions) -> Self {
        let mut session = Self {
            schema,
            options,
            data: None,
            values: BTreeMap::new(),
            files: BTreeMap::new(),
            dropdowns: BTreeMap::new(),
            toggles: udcpr_toggles(),
            boundaries: BoundaryControls::new(),
            feedback: FeedbackBoard::new(),
            notices: Vec::new(),
            busy: false,
            state: SubmitState::Idle,
        };
        session.initialize();
        session
    }

    /// Attaches the page's reference cache and (re)builds every dropdown.
    pub fn load_reference_data(&mut self, data: Arc<ReferenceData>) {
        for issue in data.integrity_issues() {
            tracing::warn!("Reference data integrity: {}", issue);
        }
        self.data = Some(data);
        self.initialize();
        tracing::info!("Reference data attached to form session");
    }

    /// Leaves every cascade dropdown disabled and raises a blocking notice.
    pub fn record_load_failure(&mut self, error: &IntakeError) {
        tracing::error!("Error loading reference data: {}", error);
        self.notices.push(Notice {
            level: NoticeLevel::Error,
            message: format!("Failed to load form data: {}", error),
        });
    }

    /// Dropdowns, toggles and boundaries back to their first-load state.
    fn initialize(&mut self) {
        let data = self.data.clone();

        for field in PARENT_DROPDOWNS {
            let dropdown = self
                .dropdowns
                .entry(field.to_string())
                .or_insert_with(|| Dropdown::new(field, DEFAULT_PLACEHOLDER));
            let options = match (field, data.as_deref()) {
                ("ulb_rp_special_authority", Some(d)) => Some(ulb_options(&d.ulbs)),
                ("zone", Some(d)) => Some(zone_options(&d.zones)),
                ("building_type", Some(d)) => Some(building_type_options(&d.building_types)),
                _ => None,
            };
            match options {
                Some(options) => dropdown.populate(DEFAULT_PLACEHOLDER, options),
                None => dropdown.reset(DEFAULT_PLACEHOLDER),
            }
        }

        for relation in Relation::all(self.options.zone_uses_rule) {
            let child = self
                .dropdowns
                .entry(relation.child().to_string())
                .or_insert_with(|| Dropdown::new(relation.child(), relation.initial_placeholder()));
            child.reset(relation.initial_placeholder());
        }

        if let Some(data) = data.as_deref() {
            for (table, rows) in &data.lookups {
                let field = lookup_field_name(table);
                if self.schema.kind(field) != Some(FieldKind::Select) {
                    tracing::debug!("No select field for lookup table '{}'", table);
                    continue;
                }
                self.dropdowns
                    .entry(field.to_string())
                    .or_insert_with(|| Dropdown::new(field, DEFAULT_PLACEHOLDER))
                    .populate(DEFAULT_PLACEHOLDER, lookup_options(rows));
            }
        }

        for toggle in &mut self.toggles {
            toggle.reset();
        }
        self.boundaries.reset();
    }

    /// Clears every value and feedback message, then re-initialises.
    pub fn reset(&mut self) {
        self.values.clear();
        self.files.clear();
        self.feedback.clear_all();
        self.initialize();
        tracing::info!("Form reset to initial state");
    }

    /// Applies one synchronous event. Returns false when the event was skipped.
    /// `File` and `Submit` need IO and are driven by the engine.
    pub fn handle(&mut self, event: &FormEvent) -> bool {
        match event {
            FormEvent::Input { field, value } => self.input(field, value),
            FormEvent::Blur { field } => self.blur(field),
            FormEvent::Change { field, value } => self.change(field, value),
            FormEvent::Radio { group, value } => self.radio(group, value),
            FormEvent::File { field, .. } => {
                tracing::warn!("File event for '{}' must be resolved before handling", field);
                false
            }
            FormEvent::Submit => {
                tracing::warn!("Submit events are driven by the intake engine");
                false
            }
        }
    }

    fn lookup(&self, field: &str, expected: &[FieldKind]) -> Option<FieldKind> {
        let Some(kind) = self.schema.kind(field) else {
            tracing::warn!("Field '{}' not found", field);
            return None;
        };
        if !expected.contains(&kind) {
            tracing::warn!("Field '{}' does not accept this event ({:?})", field, kind);
            return None;
        }
        if !self.is_active(field) {
            tracing::warn!("Field '{}' is disabled; event ignored", field);
            return None;
        }
        Some(kind)
    }

    /// Typing: applies only the character restriction.
    pub fn input(&mut self, field: &str, value: &str) -> bool {
        if self.lookup(field, &[FieldKind::Text]).is_none() {
            return false;
        }
        let value = match rules::rule_for(field).and_then(|r| r.restrict) {
            Some(restrict) => restrict.apply(value),
            None => value.to_string(),
        };
        self.values.insert(field.to_string(), value);
        true
    }

    /// Leaving a text field: full format, validate, render feedback.
    pub fn blur(&mut self, field: &str) -> bool {
        if self.lookup(field, &[FieldKind::Text]).is_none() {
            return false;
        }
        let Some(rule) = rules::rule_for(field) else {
            return true;
        };
        let mut value = self.values.get(field).cloned().unwrap_or_default();
        if let Some(format) = rule.format {
            value = format.apply(&value);
            self.values.insert(field.to_string(), value.clone());
        }
        self.check_field(field, &value);
        true
    }

    pub fn change(&mut self, field: &str, value: &str) -> bool {
        let Some(kind) = self.lookup(
            field,
            &[FieldKind::Select, FieldKind::Text, FieldKind::Radio],
        ) else {
            return false;
        };

        match kind {
            FieldKind::Radio => return self.radio(field, value),
            FieldKind::Text => return self.input(field, value) && self.blur(field),
            _ => {}
        }

        match self.dropdowns.get_mut(field) {
            Some(dropdown) => {
                if !dropdown.select(value) {
                    return false;
                }
            }
            None => {
                self.values.insert(field.to_string(), value.to_string());
            }
        }

        self.cascade_from(field);

        if let Some(side) = Side::from_boundary_field(field) {
            let effects = self.boundaries.on_change(side, value);
            for cleared in effects.cleared_fields {
                self.clear_field(&cleared);
            }
        }

        if rules::rule_for(field).is_some() {
            let current = self.value(field).to_string();
            self.check_field(field, &current);
        }
        true
    }

    fn cascade_from(&mut self, field: &str) {
        let parent = self
            .dropdowns
            .get(field)
            .and_then(|d| d.selected_option().cloned());

        for relation in Relation::all(self.options.zone_uses_rule) {
            if relation.parent() != field {
                continue;
            }
            if let Some(child) = self.dropdowns.get_mut(relation.child()) {
                update_child(relation, self.data.as_deref(), child, parent.as_ref());
            }
        }

        if field == "ulb_rp_special_authority" {
            match parent.as_ref().and_then(|p| p.data("council-name")) {
                Some(council_name) => {
                    self.values.insert("ulb_type".to_string(), council_name.to_string());
                }
                None => {
                    self.values.remove("ulb_type");
                }
            }
        }
    }

    pub fn radio(&mut self, group: &str, value: &str) -> bool {
        if self.lookup(group, &[FieldKind::Radio]).is_none() {
            return false;
        }
        self.values.insert(group.to_string(), value.to_string());

        let mut hidden_targets = Vec::new();
        for toggle in self.toggles.iter_mut().filter(|t| t.group() == group) {
            if toggle.on_change(value) == ToggleState::HiddenDisabledEmpty {
                hidden_targets.extend(toggle.targets().iter().cloned());
            }
        }
        for target in hidden_targets {
            self.clear_field(&target);
        }
        true
    }

    /// Validates and stores an upload; an invalid file is cleared.
    pub fn attach_file(&mut self, field: &str, upload: FileUpload) -> bool {
        if self.lookup(field, &[FieldKind::File]).is_none() {
            return false;
        }
        match validate_file(&upload) {
            Ok(()) => {
                self.feedback.show(field, true, "");
                self.files.insert(field.to_string(), upload);
                true
            }
            Err(message) => {
                self.feedback.show(field, false, message);
                self.files.remove(field);
                false
            }
        }
    }

    fn clear_field(&mut self, field: &str) {
        self.values.remove(field);
        if let Some(dropdown) = self.dropdowns.get_mut(field) {
            dropdown.clear_selection();
        }
        self.feedback.show(field, true, "");
    }

    fn check_field(&mut self, field: &str, value: &str) -> bool {
        let Some(rule) = rules::rule_for(field) else {
            return true;
        };
        let valid = rule.check.evaluate(value);
        self.feedback
            .show(field, valid, if valid { "" } else { rule.message });
        valid
    }

    /// Whether the field is visible and enabled right now.
    pub fn is_active(&self, field: &str) -> bool {
        if self
            .toggles
            .iter()
            .any(|t| t.controls(field) && !t.is_visible())
        {
            return false;
        }
        if let Some(active) = self.boundaries.field_active(field) {
            return active;
        }
        match self.dropdowns.get(field) {
            Some(dropdown) => !dropdown.is_disabled(),
            None => true,
        }
    }

    /// Current value; `""` when unset or when a dropdown shows its placeholder.
    pub fn value(&self, field: &str) -> &str {
        match self.dropdowns.get(field) {
            Some(dropdown) => dropdown.selected_value(),
            None => self.values.get(field).map(String::as_str).unwrap_or(""),
        }
    }

    fn selected(&self, field: &str) -> Option<&SelectOption> {
        self.dropdowns.get(field).and_then(|d| d.selected_option())
    }

    /// Re-runs every active field's check, rendering feedback for each.
    pub fn validate_all(&mut self) -> Vec<FieldFailure> {
        let mut results: Vec<(String, bool, String)> = Vec::new();

        for spec in self.schema.fields() {
            if spec.kind == FieldKind::Hidden || !self.is_active(&spec.name) {
                continue;
            }
            if spec.kind == FieldKind::File {
                if let Some(upload) = self.files.get(&spec.name) {
                    match validate_file(upload) {
                        Ok(()) => results.push((spec.name.clone(), true, String::new())),
                        Err(message) => results.push((spec.name.clone(), false, message.to_string())),
                    }
                }
                continue;
            }

            let value = self.value(&spec.name);
            if let Some(rule) = rules::rule_for(&spec.name) {
                let valid = rule.check.evaluate(value);
                let message = if valid { String::new() } else { rule.message.to_string() };
                results.push((spec.name.clone(), valid, message));
            } else if spec.required && value.trim().is_empty() {
                results.push((
                    spec.name.clone(),
                    false,
                    format!("Please fill out the {} field.", spec.name),
                ));
            }
        }

        let mut failures = Vec::new();
        for (field, valid, message) in results {
            self.feedback.show(&field, valid, &message);
            if !valid {
                failures.push(FieldFailure { field, message });
            }
        }
        failures
    }

    /// Serialises active fields plus values derived from selected options.
    pub fn payload(&self) -> FormPayload {
        let mut payload = FormPayload::default();

        for spec in self.schema.fields() {
            if spec.kind == FieldKind::Hidden || !self.is_active(&spec.name) {
                continue;
            }
            match spec.kind {
                FieldKind::File => {
                    if let Some(upload) = self.files.get(&spec.name) {
                        payload.files.push((spec.name.clone(), upload.clone()));
                    }
                }
                FieldKind::Radio => {
                    if let Some(value) = self.values.get(&spec.name) {
                        payload.set(&spec.name, value.clone());
                    }
                }
                _ => payload.set(&spec.name, self.value(&spec.name)),
            }
        }

        let data_of = |field: &str, key: &str| -> String {
            self.selected(field)
                .and_then(|o| o.data(key))
                .unwrap_or("")
                .to_string()
        };

        payload.set("taluka_id", data_of("ulb_rp_special_authority", "taluka-id"));
        payload.set("council_id", data_of("ulb_rp_special_authority", "council-id"));
        payload.set(
            "ulb_type",
            self.values.get("ulb_type").cloned().unwrap_or_default(),
        );

        let zone_id = data_of("zone", "zone-id");
        payload.set("zone", self.value("zone"));
        payload.set("zone_id", zone_id.clone());
        payload.set("zone_landuser_id", data_of("zone", "landuser-id"));

        payload.set("uses_id", self.value("uses"));
        payload.set(
            "uses_name",
            self.selected("uses").map(|o| o.label.clone()).unwrap_or_default(),
        );
        payload.set("uses_zone_id", zone_id);

        payload.set("city_specific_area_id", self.value("city_specific_area"));
        payload.set(
            "city_specific_area_name",
            self.selected("city_specific_area")
                .map(|o| o.label.clone())
                .unwrap_or_default(),
        );
        payload.set(
            "city_specific_area_areaCode",
            data_of("city_specific_area", "area-code"),
        );
        payload.set(
            "city_specific_area_councilId",
            data_of("city_specific_area", "council-id"),
        );

        payload.set("building_type_id", self.value("building_type"));
        payload.set("building_type_name", data_of("building_type", "name"));
        payload.set(
            "building_type_proposalId",
            data_of("building_type", "proposal-id"),
        );

        payload.set("building_subtype_id", self.value("building_subtype"));
        payload.set("building_subtype_name", data_of("building_subtype", "name"));
        payload.set(
            "building_subtype_bldgtypeID",
            data_of("building_subtype", "bldgtype-id"),
        );

        if let Some(code) = &self.options.contact_country_code {
            let contact = self.value("contact_no");
            if contact.len() == 10 {
                payload.set("contact_no", format!("{}{}", code, contact));
            }
        }

        payload
    }

    /// IDLE → SUBMITTING. Refuses while a submission is in flight, and
    /// aborts (back to IDLE) when any field fails validation.
    pub fn begin_submit(&mut self) -> Result<FormPayload, SubmitError> {
        if self.state == SubmitState::Submitting {
            tracing::warn!("Submission already in flight; ignoring submit");
            return Err(SubmitError::InFlight);
        }

        tracing::info!("Form submission initiated.");
        self.busy = true;

        let failures = self.validate_all();
        if !failures.is_empty() {
            tracing::warn!("Form validation failed for {} field(s).", failures.len());
            self.notices.push(Notice {
                level: NoticeLevel::Error,
                message: "Please correct the errors in the form before submitting.".to_string(),
            });
            self.busy = false;
            return Err(SubmitError::Validation(failures));
        }

        self.state = SubmitState::Submitting;
        Ok(self.payload())
    }

    /// SUBMITTING → IDLE. Success resets the form; failure keeps it for correction.
    pub fn finish_submit(&mut self, outcome: &Result<Ack, SubmitError>) {
        self.state = SubmitState::Idle;
        self.busy = false;

        match outcome {
            Ok(ack) => {
                tracing::info!(
                    "Form submitted successfully{}",
                    ack.message
                        .as_deref()
                        .map(|m| format!(": {}", m))
                        .unwrap_or_default()
                );
                self.notices.push(Notice {
                    level: NoticeLevel::Info,
                    message: "Form submitted successfully!".to_string(),
                });
                self.reset();
            }
            Err(error) => {
                tracing::error!("Error submitting form: {}", error);
                self.notices.push(Notice {
                    level: NoticeLevel::Error,
                    message: format!("An error occurred: {}. Please try again later.", error),
                });
            }
        }
    }

    /// SUBMITTING → IDLE without a server round trip; contents are kept.
    pub fn finish_dry_run(&mut self) {
        self.state = SubmitState::Idle;
        self.busy = false;
        tracing::info!("Dry run finished; form left intact");
        self.notices.push(Notice {
            level: NoticeLevel::Info,
            message: "Dry run: nothing was submitted.".to_string(),
        });
    }

    pub fn dropdown(&self, field: &str) -> Option<&Dropdown> {
        self.dropdowns.get(field)
    }

    pub fn file(&self, field: &str) -> Option<&FileUpload> {
        self.files.get(field)
    }

    pub fn feedback(&self) -> &FeedbackBoard {
        &self.feedback
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn submit_state(&self) -> SubmitState {
        self.state
    }

    pub fn toggle_state(&self, group: &str) -> Option<ToggleState> {
        self.toggles
            .iter()
            .find(|t| t.group() == group)
            .map(|t| t.state())
    }

    pub fn has_reference_data(&self) -> bool {
        self.data.is_some()
    }
}
