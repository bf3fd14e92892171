//! The tracks and plans shipped with the platform.

use super::{BillingPeriod, Plan, PlanCatalog, Track};

pub const MONTHLY: &str = "monthly";
pub const YEARLY: &str = "yearly";
pub const DEFAULT_TRACK: &str = "ai";

const TRACKS: &[(&str, &str, &str, &str, &str)] = &[
    ("ai", "Artificial Intelligence", "#7C3AED", "🤖", "m1"),
    ("swe", "Software Engineering", "#1D74F2", "⚙️", "m2"),
    ("data", "Data & Analytics", "#059669", "📊", "m3"),
    ("pm", "Product Management", "#F59E0B", "🚀", "m4"),
    ("cyber", "Cyber Security", "#DC2626", "🛡️", "m5"),
];

fn standard_plans() -> Vec<Plan> {
    vec![
        Plan {
            id: MONTHLY.to_string(),
            name: "Monthly Sprint".to_string(),
            price_cents: 2_900,
            period: BillingPeriod::Monthly,
            features: ["Access to all Courses", "Project Reviews", "Community Access"]
                .map(String::from)
                .to_vec(),
            recommended: false,
        },
        Plan {
            id: YEARLY.to_string(),
            name: "Yearly Mastery".to_string(),
            price_cents: 29_900,
            period: BillingPeriod::Yearly,
            features: [
                "Full Authority Track",
                "Verified Certification",
                "Hiring Pipeline Access",
                "Resume Verification",
            ]
            .map(String::from)
            .to_vec(),
            recommended: true,
        },
    ]
}

impl PlanCatalog {
    /// The platform's built-in catalog, defaulting to the `ai` track.
    pub fn builtin() -> Self {
        let tracks: Vec<Track> = TRACKS
            .iter()
            .map(|(id, name, accent, icon, course_id)| Track {
                id: id.to_string(),
                name: name.to_string(),
                accent: accent.to_string(),
                icon: icon.to_string(),
                course_id: course_id.to_string(),
                plans: standard_plans(),
            })
            .collect();

        // "ai" is the first entry of TRACKS.
        Self {
            tracks,
            default_track: DEFAULT_TRACK.to_string(),
            default_index: 0,
        }
    }
}
