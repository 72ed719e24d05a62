//! Table definitions using sea-query.
//!
//! One table per service. Names are singular except `people`.

use sea_query::Iden;

/// Areas table schema.
#[derive(Iden, Clone, Copy)]
pub enum Areas {
    #[iden = "area"]
    Table,
    #[iden = "id"]
    Id,
    #[iden = "name"]
    Name,
    #[iden = "description"]
    Description,
}

/// People table schema.
#[derive(Iden, Clone, Copy)]
pub enum People {
    #[iden = "people"]
    Table,
    #[iden = "id"]
    Id,
    #[iden = "name"]
    Name,
    #[iden = "email"]
    Email,
    #[iden = "username"]
    Username,
    #[iden = "area_id"]
    AreaId,
}

/// Projects table schema.
#[derive(Iden, Clone, Copy)]
pub enum Projects {
    #[iden = "project"]
    Table,
    #[iden = "id"]
    Id,
    #[iden = "name"]
    Name,
    #[iden = "start_date"]
    StartDate,
    #[iden = "end_date"]
    EndDate,
    #[iden = "area_id"]
    AreaId,
}

/// Tickets table schema.
#[derive(Iden, Clone, Copy)]
pub enum Tickets {
    #[iden = "ticket"]
    Table,
    #[iden = "id"]
    Id,
    #[iden = "title"]
    Title,
    #[iden = "description"]
    Description,
    #[iden = "status"]
    Status,
    #[iden = "type"]
    Type,
    #[iden = "priority"]
    Priority,
    #[iden = "progress"]
    Progress,
    #[iden = "estimate"]
    Estimate,
    #[iden = "created_at"]
    CreatedAt,
    #[iden = "resolved_at"]
    ResolvedAt,
    #[iden = "project_id"]
    ProjectId,
    #[iden = "people_id"]
    PeopleId,
}

/// SQL for creating the area table.
pub const CREATE_AREA_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS area (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT ''
);
"#;

/// SQL for creating the people table.
pub const CREATE_PEOPLE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS people (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL DEFAULT '',
    username TEXT NOT NULL DEFAULT '',
    area_id INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_people_name ON people(name);
"#;

/// SQL for creating the project table.
pub const CREATE_PROJECT_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS project (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    start_date TEXT NOT NULL DEFAULT '',
    end_date TEXT NOT NULL DEFAULT '',
    area_id INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_project_area ON project(area_id);
"#;

/// SQL for creating the ticket table.
pub const CREATE_TICKET_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS ticket (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    status TEXT NOT NULL,
    type TEXT NOT NULL,
    priority TEXT NOT NULL,
    progress INTEGER NOT NULL DEFAULT 0,
    estimate INTEGER NOT NULL DEFAULT 0,
    created_at TEXT,
    resolved_at TEXT,
    project_id INTEGER NOT NULL,
    people_id INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_ticket_project ON ticket(project_id);
"#;
