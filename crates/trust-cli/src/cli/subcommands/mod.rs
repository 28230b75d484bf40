mod bias;
mod consent;
mod decision;
mod prefs;

pub use bias::BiasCommands;
pub use consent::ConsentCommands;
pub use decision::DecisionCommands;
pub use prefs::PrefsCommands;
