// Alert / event filter parameters
//
// The controller accepts `filters.level`, `filters.module`,
// `filters.archived` and `searchKey` on its alert and event listings.
// Level and module are closed sets; anything else is rejected here,
// before a request is ever built.

use std::str::FromStr;

use strum::{AsRefStr, Display, EnumString, VariantNames};

use crate::error::Error;

/// Accepted values for `filters.level`.
pub const LEVEL_VALUES: &[&str] = Level::VARIANTS;

/// Accepted values for `filters.module`.
pub const MODULE_VALUES: &[&str] = Module::VARIANTS;

/// Severity of an alert or event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumString, VariantNames)]
pub enum Level {
    Error,
    Warning,
    Information,
}

/// Subsystem that raised an alert or event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumString, VariantNames)]
pub enum Module {
    Device,
    Operation,
    System,
}

impl Level {
    /// Parse a level name, failing with [`Error::InvalidFilterValue`].
    pub fn parse(value: &str) -> Result<Self, Error> {
        Self::from_str(value).map_err(|_| Error::InvalidFilterValue {
            filter: "level",
            value: value.to_owned(),
            allowed: LEVEL_VALUES,
        })
    }
}

impl Module {
    /// Parse a module name, failing with [`Error::InvalidFilterValue`].
    pub fn parse(value: &str) -> Result<Self, Error> {
        Self::from_str(value).map_err(|_| Error::InvalidFilterValue {
            filter: "module",
            value: value.to_owned(),
            allowed: MODULE_VALUES,
        })
    }
}

/// Filters for alert and event listings.
///
/// `archived` only applies to alerts; event queries ignore it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogFilter {
    pub archived: bool,
    pub level: Option<Level>,
    pub module: Option<Module>,
    pub search: Option<String>,
}

impl LogFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a filter from untyped input, validating level and module
    /// against [`LEVEL_VALUES`] / [`MODULE_VALUES`].
    pub fn parse(
        archived: bool,
        level: Option<&str>,
        module: Option<&str>,
        search: Option<&str>,
    ) -> Result<Self, Error> {
        Ok(Self {
            archived,
            level: level.map(Level::parse).transpose()?,
            module: module.map(Module::parse).transpose()?,
            search: search.map(str::to_owned),
        })
    }

    pub fn archived(mut self, archived: bool) -> Self {
        self.archived = archived;
        self
    }

    pub fn level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }

    pub fn module(mut self, module: Module) -> Self {
        self.module = Some(module);
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Query parameters for an alert listing.
    pub fn alert_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("filters.archived", self.archived.to_string())];
        self.push_common(&mut params);
        params
    }

    /// Query parameters for an event listing.
    pub fn event_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        self.push_common(&mut params);
        params
    }

    fn push_common(&self, params: &mut Vec<(&'static str, String)>) {
        if let Some(level) = self.level {
            params.push(("filters.level", level.to_string()));
        }
        if let Some(module) = self.module {
            params.push(("filters.module", module.to_string()));
        }
        // An empty search key means "no search", same as leaving it out.
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            params.push(("searchKey", search.to_owned()));
        }
    }
}
