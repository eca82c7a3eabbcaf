//! Feature toggles for interceptors
//!
//! Each interceptor is published through an [`InterceptorFactory`] that
//! names a [`Feature`]. Users switch features on and off, and pass
//! parameters, with settings of the form `+NAME`, `-NAME` or
//! `+NAME(key[value] other[value])`.

use super::{CompoundInterceptor, MutationInterceptor};
use crate::{Error, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

lazy_static! {
    static ref SETTING: std::result::Result<Regex, regex::Error> =
        Regex::new(r"^([+-])(\w+)(?:\((.*)\))?$");
    static ref PARAMS: std::result::Result<Regex, regex::Error> =
        Regex::new(r"^[\s,]*(?:\w+\[[^\]]*\][\s,]*)*$");
    static ref PARAM: std::result::Result<Regex, regex::Error> =
        Regex::new(r"(\w+)\[([^\]]*)\]");
}

/// Whole setting, whole parameter list, one `key[value]` pair
fn patterns() -> Result<(&'static Regex, &'static Regex, &'static Regex)> {
    fn get(
        compiled: &'static std::result::Result<Regex, regex::Error>,
    ) -> Result<&'static Regex> {
        compiled
            .as_ref()
            .map_err(|e| Error::invalid_feature(format!("setting pattern: {}", e)))
    }
    Ok((get(&SETTING)?, get(&PARAMS)?, get(&PARAM)?))
}

/// A named, toggleable capability
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    /// Short upper-case name used in settings
    pub name: String,
    /// Whether the feature runs when no setting mentions it
    pub on_by_default: bool,
    /// One-line description
    pub description: String,
}

impl Feature {
    /// Feature that is off unless enabled
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            on_by_default: false,
            description: String::new(),
        }
    }

    /// Run the feature unless a setting disables it
    pub fn with_on_by_default(mut self, on: bool) -> Self {
        self.on_by_default = on;
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Case-insensitive name comparison
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.on_by_default { "on" } else { "off" };
        write!(f, "{} [{}] {}", self.name, state, self.description)
    }
}

/// A parsed `+NAME(key[value])` setting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSetting {
    /// Feature name as written
    pub name: String,
    /// `+` enables, `-` disables
    pub enabled: bool,
    /// Parameter values; a key may repeat
    #[serde(default)]
    pub params: BTreeMap<String, Vec<String>>,
}

impl FeatureSetting {
    /// Parse a setting string
    pub fn parse(input: &str) -> Result<Self> {
        let (setting, params, param) = patterns()?;
        let caps = setting.captures(input.trim()).ok_or_else(|| {
            Error::invalid_feature(format!("'{}' is not of the form +NAME(key[value])", input))
        })?;

        let mut values: BTreeMap<String, Vec<String>> = BTreeMap::new();
        if let Some(inner) = caps.get(3).map(|m| m.as_str()) {
            if !params.is_match(inner) {
                return Err(Error::invalid_feature(format!(
                    "'{}' has malformed parameters",
                    input
                )));
            }
            for p in param.captures_iter(inner) {
                values
                    .entry(p[1].to_string())
                    .or_default()
                    .push(p[2].to_string());
            }
        }

        Ok(Self {
            name: caps[2].to_string(),
            enabled: &caps[1] == "+",
            params: values,
        })
    }

    /// Parameters as seen by an interceptor
    pub fn interceptor_params(&self) -> InterceptorParams {
        InterceptorParams {
            values: self.params.clone(),
        }
    }
}

impl fmt::Display for FeatureSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", if self.enabled { '+' } else { '-' }, self.name)?;
        if !self.params.is_empty() {
            let rendered: Vec<String> = self
                .params
                .iter()
                .flat_map(|(k, vs)| vs.iter().map(move |v| format!("{}[{}]", k, v)))
                .collect();
            write!(f, "({})", rendered.join(" "))?;
        }
        Ok(())
    }
}

/// Parameters handed to a factory when it builds its interceptor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterceptorParams {
    values: BTreeMap<String, Vec<String>>,
}

impl InterceptorParams {
    /// No parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// First value given for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .and_then(|vs| vs.first())
            .map(String::as_str)
    }

    /// Every value given for `key`
    pub fn get_all(&self, key: &str) -> &[String] {
        self.values.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Boolean parameter; anything but `true`/`false` is rejected
    pub fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        match self.get(key) {
            None => Ok(None),
            Some(v) if v.eq_ignore_ascii_case("true") => Ok(Some(true)),
            Some(v) if v.eq_ignore_ascii_case("false") => Ok(Some(false)),
            Some(v) => Err(Error::invalid_feature(format!(
                "parameter {} expects true or false, got '{}'",
                key, v
            ))),
        }
    }
}

/// Publishes an interceptor under a feature name
pub trait InterceptorFactory: Send + Sync {
    /// The feature this factory provides
    fn provides(&self) -> Feature;

    /// Build a fresh interceptor
    fn create_interceptor(&self, params: &InterceptorParams) -> Result<Box<dyn MutationInterceptor>>;
}

/// Resolves settings against the available factories
pub struct FeatureSelector {
    active: Vec<(Box<dyn InterceptorFactory>, InterceptorParams)>,
}

impl FeatureSelector {
    /// Decide which factories are active.
    ///
    /// A feature is active when the last setting naming it enables it, or
    /// when no setting names it and it is on by default. A setting naming
    /// an unknown feature is rejected.
    pub fn new(
        settings: Vec<FeatureSetting>,
        factories: Vec<Box<dyn InterceptorFactory>>,
    ) -> Result<Self> {
        if let Some(unknown) = settings
            .iter()
            .find(|s| !factories.iter().any(|f| f.provides().is_named(&s.name)))
        {
            return Err(Error::invalid_feature(format!(
                "no feature named {}",
                unknown.name
            )));
        }

        let active = factories
            .into_iter()
            .filter_map(|factory| {
                let feature = factory.provides();
                let setting = settings.iter().rev().find(|s| feature.is_named(&s.name));
                let enabled = setting.map_or(feature.on_by_default, |s| s.enabled);
                let params = setting
                    .map(FeatureSetting::interceptor_params)
                    .unwrap_or_default();
                enabled.then_some((factory, params))
            })
            .collect();

        Ok(Self { active })
    }

    /// Parse setting strings, then select
    pub fn from_strings(
        settings: &[&str],
        factories: Vec<Box<dyn InterceptorFactory>>,
    ) -> Result<Self> {
        let parsed = settings
            .iter()
            .map(|s| FeatureSetting::parse(s))
            .collect::<Result<Vec<_>>>()?;
        Self::new(parsed, factories)
    }

    /// Features that will run
    pub fn active_features(&self) -> Vec<Feature> {
        self.active.iter().map(|(f, _)| f.provides()).collect()
    }

    /// Build every active interceptor into one pipeline
    pub fn create_interceptor(&self) -> Result<CompoundInterceptor> {
        let children = self
            .active
            .iter()
            .map(|(factory, params)| factory.create_interceptor(params))
            .collect::<Result<Vec<_>>>()?;
        Ok(CompoundInterceptor::new(children))
    }
}
