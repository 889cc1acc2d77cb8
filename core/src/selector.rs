//! Cascading unit-type → unit selection state.
//!
//! # Design
//! Holds what a two-dropdown picker needs: the fetched unit types, a loading
//! flag, a display-only error string and the two current selections. The
//! list is fetched once via `load`; later calls are no-ops. Changing the unit type clears the unit.
//! Choosing a unit reports `(unit_type, unit)` to the optional callback, but
//! only once a unit type has been chosen.

use crate::api::ClimatiqApi;
use crate::error::ApiError;
use crate::transport::Transport;
use crate::types::{UnitType, UnitTypesResponse};

pub const INVALID_FORMAT_MESSAGE: &str = "Invalid data format received";

type OnSelect = Box<dyn FnMut(&str, &str) + Send>;

/// What the picker should currently show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorView<'a> {
    Loading,
    Error(&'a str),
    Ready {
        unit_types: &'a [UnitType],
        selected_unit_type: &'a str,
        /// `None` until a unit type is chosen; the unit picker is hidden then.
        units: Option<&'a [String]>,
        selected_unit: &'a str,
    },
}

pub struct UnitTypeSelector {
    unit_types: Vec<UnitType>,
    loading: bool,
    error: Option<String>,
    selected_unit_type: String,
    selected_unit: String,
    on_select: Option<OnSelect>,
}

impl std::fmt::Debug for UnitTypeSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnitTypeSelector")
            .field("unit_types", &self.unit_types)
            .field("loading", &self.loading)
            .field("error", &self.error)
            .field("selected_unit_type", &self.selected_unit_type)
            .field("selected_unit", &self.selected_unit)
            .field("on_select", &self.on_select.is_some())
            .finish()
    }
}

impl Default for UnitTypeSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitTypeSelector {
    /// A selector that has not fetched yet; it reports `Loading` until `load`.
    pub fn new() -> Self {
        Self {
            unit_types: Vec::new(),
            loading: true,
            error: None,
            selected_unit_type: String::new(),
            selected_unit: String::new(),
            on_select: None,
        }
    }

    pub fn with_callback(on_select: impl FnMut(&str, &str) + Send + 'static) -> Self {
        Self {
            on_select: Some(Box::new(on_select)),
            ..Self::new()
        }
    }

    /// Fetch the unit-type list through `api` and apply the outcome.
    ///
    /// The list is fetched at most once: after a fetch has settled, success
    /// or failure, further calls do nothing.
    pub fn load<T: Transport>(&mut self, api: &ClimatiqApi<T>) {
        if !self.loading {
            return;
        }
        let result = api.get_unit_types();
        self.apply(result);
    }

    /// Apply a finished fetch. A failure replaces the list with an empty one.
    pub fn apply(&mut self, result: Result<UnitTypesResponse, ApiError>) {
        match result {
            Ok(response) => {
                self.unit_types = response.unit_types;
                self.error = None;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to fetch unit types");
                let message = match err {
                    ApiError::Deserialization(_) => INVALID_FORMAT_MESSAGE.to_string(),
                    other => other.message().to_string(),
                };
                self.error = Some(message);
                self.unit_types.clear();
            }
        }
        self.loading = false;
    }

    pub fn select_unit_type(&mut self, unit_type: &str) {
        self.selected_unit_type = unit_type.to_string();
        self.selected_unit.clear();
    }

    pub fn select_unit(&mut self, unit: &str) {
        self.selected_unit = unit.to_string();
        if self.selected_unit_type.is_empty() {
            return;
        }
        if let Some(on_select) = self.on_select.as_mut() {
            on_select(&self.selected_unit_type, unit);
        }
    }

    pub fn unit_types(&self) -> &[UnitType] {
        &self.unit_types
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn selected_unit_type(&self) -> &str {
        &self.selected_unit_type
    }

    pub fn selected_unit(&self) -> &str {
        &self.selected_unit
    }

    /// Units of the selected type; empty when nothing (or an unknown type) is selected.
    pub fn available_units(&self) -> &[String] {
        self.unit_types
            .iter()
            .find(|t| t.unit_type == self.selected_unit_type)
            .map(|t| t.units.as_slice())
            .unwrap_or(&[])
    }

    pub fn view(&self) -> SelectorView<'_> {
        if self.loading {
            return SelectorView::Loading;
        }
        if let Some(error) = &self.error {
            return SelectorView::Error(error);
        }
        SelectorView::Ready {
            unit_types: &self.unit_types,
            selected_unit_type: &self.selected_unit_type,
            units: (!self.selected_unit_type.is_empty()).then(|| self.available_units()),
            selected_unit: &self.selected_unit,
        }
    }
}
