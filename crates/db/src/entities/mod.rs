//! `SeaORM` entity definitions.

pub mod clients;
pub mod organizations;
pub mod sea_orm_active_enums;
pub mod service_records;
pub mod technicians;
pub mod users;
