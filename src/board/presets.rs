// Stage configurations for the CRM record boards

use crate::models::Stage;

/// Record kinds that have a board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoardKind {
    Leads,
    Deals,
    Opportunities,
}

impl BoardKind {
    pub const ALL: [BoardKind; 3] = [BoardKind::Leads, BoardKind::Deals, BoardKind::Opportunities];

    pub fn as_str(&self) -> &'static str {
        match self {
            BoardKind::Leads => "leads",
            BoardKind::Deals => "deals",
            BoardKind::Opportunities => "opportunities",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "leads" | "lead" => Some(BoardKind::Leads),
            "deals" | "deal" => Some(BoardKind::Deals),
            "opportunities" | "opportunity" => Some(BoardKind::Opportunities),
            _ => None,
        }
    }

    /// Singular noun used in messages ("lead 3")
    pub fn record_noun(&self) -> &'static str {
        match self {
            BoardKind::Leads => "lead",
            BoardKind::Deals => "deal",
            BoardKind::Opportunities => "opportunity",
        }
    }

    /// Record field holding the stage value
    pub fn stage_field(&self) -> &'static str {
        match self {
            BoardKind::Leads => "status",
            BoardKind::Deals | BoardKind::Opportunities => "stage",
        }
    }

    /// Fields surfaced on cards
    pub fn card_fields(&self) -> Vec<String> {
        let fields: &[&str] = match self {
            BoardKind::Leads => &["contact_name", "priority", "next_interaction_date"],
            BoardKind::Deals | BoardKind::Opportunities => {
                &["company_name", "contact_name", "value", "grade"]
            }
        };
        fields.iter().map(|f| f.to_string()).collect()
    }

    pub fn default_stages(&self) -> Vec<Stage> {
        match self {
            BoardKind::Leads => lead_stages(),
            BoardKind::Deals => deal_stages(),
            BoardKind::Opportunities => opportunity_stages(),
        }
    }
}

/// Lead pipeline. The lead backend stores "New Lead" for the first column.
pub fn lead_stages() -> Vec<Stage> {
    vec![
        Stage::new("new_leads", "New Leads", "#ff6d3b").with_aliases(&["New Lead"]),
        Stage::new("working_on_it", "Working on it", "#fdab3d"),
        Stage::new("prospect", "Prospect", "#0086c0"),
        Stage::new("unqualified", "Unqualified", "#df2f4a"),
    ]
}

/// Deal pipeline (prospects flow)
pub fn deal_stages() -> Vec<Stage> {
    vec![
        Stage::new("prospects", "Prospects", "#0086c0"),
        Stage::new("preparing_proposal", "Preparing Proposal", "#fdab3d")
            .with_aliases(&["Preparing proposal"]),
        Stage::new("proposal_sent", "Proposal Sent", "#9cd326").with_aliases(&["Proposal sent"]),
        Stage::new("closed_won", "Closed Won", "#00c875"),
        Stage::new("lost", "Lost", "#df2f4a"),
        Stage::new("completed", "Completed", "#579bfc"),
    ]
}

/// Opportunity pipeline (estimating flow)
pub fn opportunity_stages() -> Vec<Stage> {
    vec![
        Stage::new("leads", "Leads", "#ff6d3b"),
        Stage::new("estimating", "Estimating", "#fdab3d"),
        Stage::new("submitted", "Submitted", "#9cd326"),
        Stage::new("won", "Won", "#00c875"),
        Stage::new("lost", "Lost", "#df2f4a"),
        Stage::new("declined", "Declined", "#c4c4c4"),
    ]
}
