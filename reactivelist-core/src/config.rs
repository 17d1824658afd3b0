//! Typed list configuration.
//!
//! `ListConfig` is an immutable snapshot of the component's options. Hosts
//! replace it wholesale on every prop change; [`ListConfig::diff`] decides
//! which of the changes are relevant to the query.

use crate::error::{ListError, ListResult};
use reactivelist_types::SortOrder;
use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Suffix of the internal companion component id.
pub const INTERNAL_SUFFIX: &str = "__internal";

/// The `pagination` option: `false`, `true` or `"continuous"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaginationSetting {
    #[default]
    Disabled,
    Classic,
    Continuous,
}

impl PaginationSetting {
    /// Whether any kind of pagination was requested.
    pub fn is_enabled(self) -> bool {
        !matches!(self, Self::Disabled)
    }
}

impl Serialize for PaginationSetting {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Disabled => serializer.serialize_bool(false),
            Self::Classic => serializer.serialize_bool(true),
            Self::Continuous => serializer.serialize_str("continuous"),
        }
    }
}

impl<'de> Deserialize<'de> for PaginationSetting {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Flag(bool),
            Mode(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Flag(false) => Ok(Self::Disabled),
            Raw::Flag(true) => Ok(Self::Classic),
            Raw::Mode(mode) if mode == "continuous" => Ok(Self::Continuous),
            Raw::Mode(other) => Err(de::Error::custom(format!(
                "unknown pagination mode `{other}`, expected true, false or \"continuous\""
            ))),
        }
    }
}

/// Where classic pagination controls are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaginationAt {
    Top,
    #[default]
    Bottom,
    Both,
}

/// One entry of the `sortOptions` dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortOption {
    pub label: String,
    pub data_field: String,
    pub sort_by: SortOrder,
}

impl SortOption {
    pub fn new(label: impl Into<String>, data_field: impl Into<String>, sort_by: SortOrder) -> Self {
        Self {
            label: label.into(),
            data_field: data_field.into(),
            sort_by,
        }
    }
}

/// A term of a `react` clause: a component id, a list of terms, or a
/// nested clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReactTerm {
    Component(String),
    List(Vec<ReactTerm>),
    Clause(Box<ReactClause>),
}

/// Which other components' filters this list reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReactClause {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub and: Option<ReactTerm>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub or: Option<ReactTerm>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not: Option<ReactTerm>,
}

impl ReactClause {
    /// A clause that ANDs a single component.
    pub fn and_component(component: impl Into<String>) -> Self {
        Self {
            and: Some(ReactTerm::Component(component.into())),
            ..Default::default()
        }
    }

    /// Returns a copy with `component` added to the `and` term.
    ///
    /// A list gets the component appended, any other term is wrapped into a
    /// two-element list, and a missing term becomes a one-element list.
    #[must_use]
    pub fn pushed_to_and(&self, component: &str) -> Self {
        let pushed = ReactTerm::Component(component.to_string());
        let and = match self.and.clone() {
            Some(ReactTerm::List(mut terms)) => {
                terms.push(pushed);
                ReactTerm::List(terms)
            }
            Some(term) => ReactTerm::List(vec![term, pushed]),
            None => ReactTerm::List(vec![pushed]),
        };
        Self {
            and: Some(and),
            ..self.clone()
        }
    }
}

/// Factory for the default query fragment.
///
/// The fragment is re-evaluated on every config change and compared by
/// value, since two closures cannot be compared.
#[derive(Clone)]
pub struct DefaultQuery(Arc<dyn Fn() -> Value + Send + Sync>);

impl DefaultQuery {
    pub fn new(factory: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        Self(Arc::new(factory))
    }

    pub fn evaluate(&self) -> Value {
        (self.0)()
    }
}

impl fmt::Debug for DefaultQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DefaultQuery(..)")
    }
}

fn default_size() -> u64 {
    10
}

fn default_pages() -> u32 {
    5
}

fn default_true() -> bool {
    true
}

fn default_include_fields() -> Vec<String> {
    vec!["*".to_string()]
}

/// Configuration of one results list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListConfig {
    /// Unique id the list registers with the store.
    pub component_id: String,
    /// Field used for the scalar `sortBy` option.
    pub data_field: String,
    /// When set, the list pages through composite aggregation buckets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation_field: Option<String>,
    /// Page length.
    #[serde(default = "default_size")]
    pub size: u64,
    #[serde(default)]
    pub pagination: PaginationSetting,
    #[serde(default)]
    pub pagination_at: PaginationAt,
    /// Number of page buttons shown by classic pagination.
    #[serde(default = "default_pages")]
    pub pages: u32,
    #[serde(default)]
    pub show_end_page: bool,
    #[serde(default = "default_true")]
    pub show_result_stats: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortOrder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_options: Option<Vec<SortOption>>,
    #[serde(default = "default_include_fields")]
    pub include_fields: Vec<String>,
    #[serde(default)]
    pub exclude_fields: Vec<String>,
    /// Subscribe to live updates.
    #[serde(default)]
    pub stream: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub react: Option<ReactClause>,
    /// Publish the current page to the URL.
    #[serde(rename = "URLParams", default)]
    pub url_params: bool,
    /// URL parameter name; the component id when empty.
    #[serde(rename = "URLPageParam", default)]
    pub url_page_param: String,
    #[serde(default = "default_true")]
    pub reset_page_on_query_change: bool,
    /// Requested page, 1-based. `0` means unset.
    #[serde(default)]
    pub current_page: u64,
    #[serde(skip)]
    pub default_query: Option<DefaultQuery>,
}

impl ListConfig {
    /// Creates a configuration with every option at its default.
    pub fn new(component_id: impl Into<String>, data_field: impl Into<String>) -> Self {
        Self {
            component_id: component_id.into(),
            data_field: data_field.into(),
            aggregation_field: None,
            size: default_size(),
            pagination: PaginationSetting::Disabled,
            pagination_at: PaginationAt::Bottom,
            pages: default_pages(),
            show_end_page: false,
            show_result_stats: true,
            sort_by: None,
            sort_options: None,
            include_fields: default_include_fields(),
            exclude_fields: Vec::new(),
            stream: false,
            react: None,
            url_params: false,
            url_page_param: String::new(),
            reset_page_on_query_change: true,
            current_page: 0,
            default_query: None,
        }
    }

    /// Parses and validates a JSON configuration.
    pub fn from_json(json: &str) -> ListResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    pub fn with_pagination(mut self, pagination: PaginationSetting) -> Self {
        self.pagination = pagination;
        self
    }

    pub fn with_aggregation_field(mut self, field: impl Into<String>) -> Self {
        self.aggregation_field = Some(field.into());
        self
    }

    pub fn with_sort_by(mut self, order: SortOrder) -> Self {
        self.sort_by = Some(order);
        self
    }

    pub fn with_sort_options(mut self, options: Vec<SortOption>) -> Self {
        self.sort_options = Some(options);
        self
    }

    pub fn with_include_fields(mut self, fields: Vec<String>) -> Self {
        self.include_fields = fields;
        self
    }

    pub fn with_exclude_fields(mut self, fields: Vec<String>) -> Self {
        self.exclude_fields = fields;
        self
    }

    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn with_react(mut self, react: ReactClause) -> Self {
        self.react = Some(react);
        self
    }

    /// Enables URL sync, optionally under a custom parameter name.
    pub fn with_url_params(mut self, param: Option<&str>) -> Self {
        self.url_params = true;
        self.url_page_param = param.unwrap_or_default().to_string();
        self
    }

    pub fn with_current_page(mut self, page: u64) -> Self {
        self.current_page = page;
        self
    }

    pub fn with_reset_page_on_query_change(mut self, reset: bool) -> Self {
        self.reset_page_on_query_change = reset;
        self
    }

    pub fn with_default_query(
        mut self,
        factory: impl Fn() -> Value + Send + Sync + 'static,
    ) -> Self {
        self.default_query = Some(DefaultQuery::new(factory));
        self
    }

    /// Checks required options and value ranges.
    pub fn validate(&self) -> ListResult<()> {
        if self.component_id.trim().is_empty() {
            return Err(ListError::InvalidConfig("componentId is required".into()));
        }
        if self.data_field.trim().is_empty() {
            return Err(ListError::InvalidConfig(format!(
                "{}: dataField is required",
                self.component_id
            )));
        }
        if self.size == 0 {
            return Err(ListError::InvalidConfig(format!(
                "{}: size must be positive",
                self.component_id
            )));
        }
        if self.pages == 0 {
            return Err(ListError::InvalidConfig(format!(
                "{}: pages must be positive",
                self.component_id
            )));
        }
        if self.sort_options.as_ref().is_some_and(Vec::is_empty) {
            return Err(ListError::InvalidConfig(format!(
                "{}: sortOptions must not be empty",
                self.component_id
            )));
        }
        Ok(())
    }

    /// Id of the companion component that carries the default-query filter.
    pub fn internal_component_id(&self) -> String {
        format!("{}{INTERNAL_SUFFIX}", self.component_id)
    }

    /// Name of the URL parameter holding the page number.
    pub fn url_page_param(&self) -> &str {
        if self.url_page_param.is_empty() {
            &self.component_id
        } else {
            &self.url_page_param
        }
    }

    /// Pagination together with an aggregation field is not supported; the
    /// list falls back to infinite loading.
    pub fn has_pagination_conflict(&self) -> bool {
        self.pagination.is_enabled() && self.aggregation_field.is_some()
    }

    /// Serialized form published to the store as component props.
    pub fn to_props(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Compares two snapshots of the same list.
    pub fn diff(&self, new: &ListConfig) -> ConfigChanges {
        ConfigChanges {
            query_options: self.sort_options != new.sort_options
                || self.sort_by != new.sort_by
                || self.size != new.size
                || self.data_field != new.data_field
                || self.include_fields != new.include_fields
                || self.exclude_fields != new.exclude_fields,
            stream: self.stream != new.stream,
            react: self.react != new.react,
            pagination: self.pagination != new.pagination,
            current_page: self.current_page != new.current_page,
            props: self.to_props() != new.to_props(),
        }
    }
}

/// Which groups of options changed between two config snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConfigChanges {
    /// Sort, field selection or page size changed.
    pub query_options: bool,
    pub stream: bool,
    pub react: bool,
    pub pagination: bool,
    pub current_page: bool,
    /// Any serializable option changed.
    pub props: bool,
}

impl ConfigChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
