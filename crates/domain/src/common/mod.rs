mod errors;
mod identifier;

pub use errors::DomainError;
pub use identifier::{
    BuildingIdentifier, EventIdentifier, LocationIdentifier, RequestIdentifier,
    SurveyAnswerIdentifier, SurveyIdentifier, SurveyQuestionIdentifier, UserIdentifier,
};
