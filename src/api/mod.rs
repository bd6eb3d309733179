pub mod eastmoney;
pub mod eastmoney_dto;
pub mod fundgz;
pub mod fundgz_dto;
pub mod metals;
pub mod metals_dto;
pub mod utils;
