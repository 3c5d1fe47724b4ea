use sea_query::Iden;

#[derive(Iden, Clone)]
pub enum ContactRecord {
    Table,
    Id,
    Name,
    Email,
    Message,
    CreatedAt,
}
