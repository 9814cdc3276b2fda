//! Recorded identifiers exposed by the Census 2021 dataset API.
//!
//! The API offers no cheap way to enumerate population types, so these lists
//! are kept by hand and verified by the `check-constants` job, which reports
//! drift between them and the live service.

/// Root of every population-type endpoint.
pub const API_ROOT: &str = "https://api.beta.ons.gov.uk/v1/population-types";

/// Population types with microdata available for custom tables.
pub const POPULATION_TYPES: &[&str] = &["HH", "HRP", "UR", "UR_CE", "UR_HH"];

const STANDARD_AREA_TYPES: &[&str] = &["ctry", "lsoa", "ltla", "msoa", "nat", "oa", "rgn", "utla"];

const HOUSEHOLD_DIMENSIONS: &[&str] = &[
    "accommodation_type_5a",
    "hh_adults_and_children_8a",
    "hh_composition_15a",
    "hh_deprivation",
    "hh_size_5a",
    "hh_tenure_9a",
    "heating_type_13a",
    "number_of_cars_5a",
    "occupancy_rating_bedrooms_6a",
];

const HRP_DIMENSIONS: &[&str] = &[
    "accommodation_type_5a",
    "hh_size_5a",
    "hh_tenure_9a",
    "hrp_age_6a",
    "hrp_economic_activity_status_10a",
    "hrp_ethnic_group_tb_6a",
    "hrp_ns_sec_10a",
    "hrp_sex",
];

const RESIDENT_DIMENSIONS: &[&str] = &[
    "country_of_birth_12a",
    "disability_3a",
    "economic_activity_status_12a",
    "ethnic_group_tb_6a",
    "health_in_general",
    "highest_qualification",
    "industry_current_88a",
    "legal_partnership_status_6a",
    "occupation_current_10a",
    "religion_tb",
    "resident_age_6a",
    "sex",
];

const COMMUNAL_DIMENSIONS: &[&str] = &[
    "economic_activity_status_12a",
    "ethnic_group_tb_6a",
    "resident_age_6a",
    "sex",
];

/// Area types recorded for `population_type`, or an empty slice when the
/// population type is not recorded.
///
/// # Examples
/// ```
/// use census21api_core::constants::area_types_for;
///
/// assert!(area_types_for("UR").contains(&"nat"));
/// assert!(area_types_for("XX").is_empty());
/// ```
#[must_use]
pub fn area_types_for(population_type: &str) -> &'static [&'static str] {
    if POPULATION_TYPES.contains(&population_type) {
        STANDARD_AREA_TYPES
    } else {
        &[]
    }
}

/// Dimensions recorded for `population_type`, or an empty slice when the
/// population type is not recorded.
#[must_use]
pub fn dimensions_for(population_type: &str) -> &'static [&'static str] {
    match population_type {
        "HH" => HOUSEHOLD_DIMENSIONS,
        "HRP" => HRP_DIMENSIONS,
        "UR" | "UR_HH" => RESIDENT_DIMENSIONS,
        "UR_CE" => COMMUNAL_DIMENSIONS,
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashSet;

    #[rstest]
    fn every_population_type_has_area_types_and_dimensions() {
        for population_type in POPULATION_TYPES {
            assert!(!area_types_for(population_type).is_empty());
            assert!(!dimensions_for(population_type).is_empty());
        }
    }

    #[rstest]
    #[case("HH")]
    #[case("HRP")]
    #[case("UR")]
    #[case("UR_CE")]
    #[case("UR_HH")]
    fn recorded_dimensions_are_unique(#[case] population_type: &str) {
        let dimensions = dimensions_for(population_type);
        let unique: HashSet<_> = dimensions.iter().collect();
        assert_eq!(unique.len(), dimensions.len());
    }

    #[rstest]
    fn unknown_population_type_has_nothing_recorded() {
        assert!(area_types_for("NOPE").is_empty());
        assert!(dimensions_for("NOPE").is_empty());
    }
}
