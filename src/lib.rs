#[allow(non_snake_case)]
pub mod Chemistry;
#[allow(non_snake_case)]
pub mod Dispensing;
#[allow(non_snake_case)]
pub mod Export;
#[allow(non_snake_case)]
pub mod QualityControl;
#[allow(non_snake_case)]
pub mod Reactions;
#[allow(non_snake_case)]
pub mod Utils;
pub mod error;
pub mod pipeline;
pub mod settings;
