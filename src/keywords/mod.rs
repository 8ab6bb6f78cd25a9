pub mod opportunity;
pub mod research;

pub use opportunity::{
    Competition, InterestLevel, KeywordObservation, KeywordOpportunity, KeywordQuality,
    KeywordVideo, OpportunityScorer,
};
pub use research::{parse_keyword_candidates, KeywordReport};
