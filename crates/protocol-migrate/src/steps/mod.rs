//! Built-in migration steps, one per version transition
//!
//! Each module is named after the version it produces. The transformations
//! mirror the historical evolution of the protocol format:
//!
//! | target | delta |
//! |--------|-------|
//! | 2 | `variableRegistry` renamed `codebook` |
//! | 3 | `externalData` becomes the `assetManifest`; variable `label` → `name` |
//! | 4 | flat skip logic rewritten into filter expression trees |
//! | 5 | scalar option lists become `{label, value}` objects |
//! | 6 | prompts gain ids; entity `iconName` → `iconVariant` |
//! | 7 | entity `displayVariable` retired |
//! | 8 | stages gain ids |

mod v2;
mod v3;
mod v4;
mod v5;
mod v6;
mod v7;
mod v8;

pub use v2::RenameVariableRegistry;
pub use v3::IntroduceAssetManifest;
pub use v4::FilterExpressionTrees;
pub use v5::ObjectOptions;
pub use v6::PromptIdentifiers;
pub use v7::RetireDisplayVariable;
pub use v8::StageIdentifiers;
