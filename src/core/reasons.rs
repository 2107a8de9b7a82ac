use std::collections::BTreeMap;

use crate::core::weights::Dimension;

/// Appended when the posting's boost was applied
pub const FEATURED_REASON: &str = "Featured listing";

/// Human-readable explanations for a breakdown
///
/// Reasons follow dimension declaration order; the same breakdown always
/// yields the same list.
pub fn generate_reasons(breakdown: &BTreeMap<Dimension, u8>, boost_active: bool) -> Vec<String> {
    let mut reasons: Vec<String> = breakdown
        .iter()
        .filter_map(|(dimension, score)| reason_for(*dimension, *score))
        .map(str::to_string)
        .collect();

    if boost_active {
        reasons.push(FEATURED_REASON.to_string());
    }

    reasons
}

/// Canned reason for one dimension score, if it crosses a threshold
pub fn reason_for(dimension: Dimension, score: u8) -> Option<&'static str> {
    match dimension {
        Dimension::JobTitle => match score {
            100.. => Some("Matches the job title you're looking for"),
            60..=99 => Some("Similar to the jobs you're looking for"),
            _ => None,
        },
        Dimension::JobType => match score {
            100.. => Some("Matches your preferred job type"),
            65..=99 => Some("Related to your preferred job type"),
            _ => None,
        },
        Dimension::Location => match score {
            100.. => Some("In your preferred location"),
            80..=99 => Some("Near your preferred location"),
            60..=79 => Some("Within your work radius"),
            1..=30 => Some("Outside your preferred area"),
            _ => None,
        },
        Dimension::Salary => match score {
            80.. => Some("Salary meets your expectations"),
            60..=79 => Some("Salary is close to your expectations"),
            40..=59 => Some("Salary is below your expectations"),
            _ => None,
        },
        Dimension::Skills => match score {
            100.. => Some("You have all the required skills"),
            60..=99 => Some("You have most of the required skills"),
            _ => None,
        },
        Dimension::Experience => match score {
            80.. => Some("Your experience fits this role"),
            _ => None,
        },
        Dimension::Availability => match score {
            100.. => Some("You're available today"),
            _ => None,
        },
        Dimension::Languages => match score {
            100.. => Some("You speak the preferred languages"),
            _ => None,
        },
        Dimension::Rating => match score {
            80.. => Some("Your rating stands out to employers"),
            _ => None,
        },
        Dimension::Recency => match score {
            100.. => Some("Your profile is recently active"),
            _ => None,
        },
        Dimension::Priority => match score {
            60.. => Some("Fresh listing with strong demand"),
            _ => None,
        },
    }
}
