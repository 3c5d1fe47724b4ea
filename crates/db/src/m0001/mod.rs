mod contact_record;

use sqlx_migrator::vec_box;

pub struct Migration;

sqlx_migrator::sqlite_migration!(
    Migration,
    "folio",
    "m0001",
    vec_box![],
    vec_box![contact_record::CreateTable, contact_record::CreateIdx1]
);
