pub mod limits;
pub mod portfolio;
pub mod refresh;
pub mod subscription;
pub mod wallet;
