//! Feature toggles.
//!
//! Toggles are read once from the `[features]` configuration table into a
//! [`FeatureToggles`] value that is passed explicitly to whatever needs it.
//! Only the toggles enumerated in [`Feature`] are recognized.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;

/// Macro to define the recognized toggles together with their config keys.
macro_rules! define_features {
    (
        $(
            $(#[$meta:meta])*
            $variant:ident => $key:literal
        ),+ $(,)?
    ) => {
        /// A recognized feature toggle.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        pub enum Feature {
            $(
                $(#[$meta])*
                $variant,
            )+
        }

        impl Feature {
            /// Every recognized toggle, in declaration order.
            pub const ALL: &'static [Feature] = &[$(Feature::$variant),+];

            /// The configuration key of the toggle.
            pub fn key(&self) -> &'static str {
                match self {
                    $(Feature::$variant => $key,)+
                }
            }
        }
    };
}

define_features! {
    /// Major/minor versioning of allocation lines.
    AllocationLineMajorMinorVersioning => "allocationLineMajorMinorVersioningEnabled",
    /// The provider profiling service is switched off.
    ProviderProfilingServiceDisabled => "providerProfilingServiceDisabled",
    /// Aggregate functions inside calculations.
    AggregateSupportInCalculations => "aggregateSupportInCalculationsEnabled",
    /// Aggregates across calculations.
    AggregateOverCalculations => "aggregateOverCalculationsEnabled",
    /// Publish button in the funding UI.
    PublishButton => "publishButtonEnabled",
    /// Calculation run timeouts.
    CalculationTimeout => "calculationTimeoutEnabled",
    /// Filters on the publish and approve pages.
    PublishAndApprovePageFilters => "publishAndApprovePageFiltersEnabled",
    /// Check job status before choose-and-refresh.
    CheckJobStatusForChooseAndRefresh => "checkJobStatusForChooseAndRefreshEnabled",
    /// Duplicate calculation name check.
    DuplicateCalculationNameCheck => "duplicateCalculationNameCheckEnabled",
    /// Dynamic build project compilation.
    DynamicBuildProject => "dynamicBuildProjectEnabled",
    /// Detailed exception messages in responses.
    ExceptionMessages => "exceptionMessagesEnabled",
    /// New edit-calculation page.
    NewEditCalculationPage => "newEditCalculationPageEnabled",
    /// New manage-data-sources page.
    NewManageDataSourcesPage => "newManageDataSourcesPageEnabled",
    /// New provider calculation results index.
    NewProviderCalculationResultsIndex => "newProviderCalculationResultsIndexEnabled",
    /// User notifications.
    Notifications => "notificationsEnabled",
    /// Process dataset definition field changes.
    ProcessDatasetDefinitionFieldChanges => "processDatasetDefinitionFieldChangesEnabled",
    /// Process dataset definition name changes.
    ProcessDatasetDefinitionNameChanges => "processDatasetDefinitionNameChangesEnabled",
    /// Provider information on the view-funding page.
    ProviderInformationViewInViewFundingPage => "providerInformationViewInViewFundingPageEnabled",
    /// Provider variations.
    ProviderVariations => "providerVariationsEnabled",
    /// Role-based access control.
    RoleBasedAccess => "roleBasedAccessEnabled",
    /// Search mode "all".
    SearchModeAll => "searchModeAllEnabled",
    /// Field definition ids in source datasets.
    UseFieldDefinitionIdsInSourceDatasets => "useFieldDefinitionIdsInSourceDatasetsEnabled",
    /// All allocation result versions in the feed index.
    AllAllocationResultsVersionsInFeedIndex => "allAllocationResultsVersionsInFeedIndexEnabled",
}

impl Feature {
    /// Look up a toggle by configuration key (case-insensitive).
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|feature| feature.key().eq_ignore_ascii_case(key))
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Resolved feature toggle state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureToggles {
    enabled: HashSet<Feature>,
}

impl FeatureToggles {
    /// Build toggles from raw key/value settings.
    ///
    /// A toggle is enabled only when its value parses as the boolean `true`
    /// (case-insensitive). Missing, empty, and non-boolean values leave it
    /// disabled. Unrecognized keys are ignored.
    pub fn from_settings(settings: &HashMap<String, String>) -> Self {
        let mut enabled = HashSet::new();

        for (key, value) in settings {
            let Some(feature) = Feature::from_key(key) else {
                tracing::warn!(key = %key, "Ignoring unrecognized feature toggle");
                continue;
            };

            if parse_flag(value) {
                enabled.insert(feature);
            }
        }

        Self { enabled }
    }

    /// Toggles with the given features switched on.
    pub fn with_enabled(features: impl IntoIterator<Item = Feature>) -> Self {
        Self {
            enabled: features.into_iter().collect(),
        }
    }

    /// Whether a toggle is switched on.
    pub fn is_enabled(&self, feature: Feature) -> bool {
        self.enabled.contains(&feature)
    }

    /// Every recognized toggle with its state, in declaration order.
    pub fn states(&self) -> Vec<(Feature, bool)> {
        Feature::ALL
            .iter()
            .map(|feature| (*feature, self.is_enabled(*feature)))
            .collect()
    }
}

fn parse_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}
