//! Table descriptions for each record kind.

use std::str::FromStr;

use sea_query::{Expr, SimpleExpr};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::SqlRecord;
use crate::model::{
    Area, NoField, Person, PersonFilter, PersonKey, Project, ProjectFilter, ProjectKey, Record,
    Ticket, TicketFilter, TicketKey,
};
use crate::storage::schema::{
    Areas, People, Projects, Tickets, CREATE_AREA_TABLE, CREATE_PEOPLE_TABLE,
    CREATE_PROJECT_TABLE, CREATE_TICKET_TABLE,
};
use crate::storage::{Result, StorageError};

impl SqlRecord for Area {
    type Column = Areas;

    const TABLE: Areas = Areas::Table;
    const ID: Areas = Areas::Id;
    const CREATE_TABLE: &'static str = CREATE_AREA_TABLE;

    fn data_columns() -> Vec<Areas> {
        vec![Areas::Name, Areas::Description]
    }

    fn data_values(&self) -> Vec<SimpleExpr> {
        vec![self.name.clone().into(), self.description.clone().into()]
    }

    fn from_row(row: &SqliteRow) -> Result<Self> {
        Ok(Self {
            id: Some(row.try_get("id")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
        })
    }

    fn key_column(key: NoField) -> Areas {
        match key {}
    }

    fn filter_expr(filter: &NoField) -> SimpleExpr {
        match *filter {}
    }
}

impl SqlRecord for Person {
    type Column = People;

    const TABLE: People = People::Table;
    const ID: People = People::Id;
    const CREATE_TABLE: &'static str = CREATE_PEOPLE_TABLE;

    fn data_columns() -> Vec<People> {
        vec![People::Name, People::Email, People::Username, People::AreaId]
    }

    fn data_values(&self) -> Vec<SimpleExpr> {
        vec![
            self.name.clone().into(),
            self.email.clone().into(),
            self.username.clone().into(),
            self.area_id.into(),
        ]
    }

    fn from_row(row: &SqliteRow) -> Result<Self> {
        Ok(Self {
            id: Some(row.try_get("id")?),
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            username: row.try_get("username")?,
            area_id: row.try_get("area_id")?,
        })
    }

    fn key_column(key: PersonKey) -> People {
        match key {
            PersonKey::Area => People::AreaId,
        }
    }

    fn filter_expr(filter: &PersonFilter) -> SimpleExpr {
        match filter {
            PersonFilter::Name(name) => Expr::col(People::Name).eq(name.as_str()),
        }
    }
}

impl SqlRecord for Project {
    type Column = Projects;

    const TABLE: Projects = Projects::Table;
    const ID: Projects = Projects::Id;
    const CREATE_TABLE: &'static str = CREATE_PROJECT_TABLE;

    fn data_columns() -> Vec<Projects> {
        vec![
            Projects::Name,
            Projects::StartDate,
            Projects::EndDate,
            Projects::AreaId,
        ]
    }

    fn data_values(&self) -> Vec<SimpleExpr> {
        vec![
            self.name.clone().into(),
            self.start_date.clone().into(),
            self.end_date.clone().into(),
            self.area_id.into(),
        ]
    }

    fn from_row(row: &SqliteRow) -> Result<Self> {
        Ok(Self {
            id: Some(row.try_get("id")?),
            name: row.try_get("name")?,
            start_date: row.try_get("start_date")?,
            end_date: row.try_get("end_date")?,
            area_id: row.try_get("area_id")?,
        })
    }

    fn key_column(key: ProjectKey) -> Projects {
        match key {
            ProjectKey::Area => Projects::AreaId,
        }
    }

    fn filter_expr(filter: &ProjectFilter) -> SimpleExpr {
        match filter {
            ProjectFilter::Area(area_id) => Expr::col(Projects::AreaId).eq(*area_id),
        }
    }
}

impl SqlRecord for Ticket {
    type Column = Tickets;

    const TABLE: Tickets = Tickets::Table;
    const ID: Tickets = Tickets::Id;
    const CREATE_TABLE: &'static str = CREATE_TICKET_TABLE;

    fn data_columns() -> Vec<Tickets> {
        vec![
            Tickets::Title,
            Tickets::Description,
            Tickets::Status,
            Tickets::Type,
            Tickets::Priority,
            Tickets::Progress,
            Tickets::Estimate,
            Tickets::CreatedAt,
            Tickets::ResolvedAt,
            Tickets::ProjectId,
            Tickets::PeopleId,
        ]
    }

    fn data_values(&self) -> Vec<SimpleExpr> {
        vec![
            self.title.clone().into(),
            self.description.clone().into(),
            self.status.as_str().into(),
            self.ticket_type.as_str().into(),
            self.priority.as_str().into(),
            self.progress.into(),
            self.estimate.into(),
            self.created_at.clone().into(),
            self.resolved_at.clone().into(),
            self.project_id.into(),
            self.people_id.into(),
        ]
    }

    fn from_row(row: &SqliteRow) -> Result<Self> {
        Ok(Self {
            id: Some(row.try_get("id")?),
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            status: parse_column(row, "status")?,
            ticket_type: parse_column(row, "type")?,
            priority: parse_column(row, "priority")?,
            progress: row.try_get("progress")?,
            estimate: row.try_get("estimate")?,
            created_at: row.try_get("created_at")?,
            resolved_at: row.try_get("resolved_at")?,
            project_id: row.try_get("project_id")?,
            people_id: row.try_get("people_id")?,
        })
    }

    fn key_column(key: TicketKey) -> Tickets {
        match key {
            TicketKey::Project => Tickets::ProjectId,
            TicketKey::Person => Tickets::PeopleId,
        }
    }

    fn filter_expr(filter: &TicketFilter) -> SimpleExpr {
        match filter {
            TicketFilter::Status(status) => Expr::col(Tickets::Status).eq(status.as_str()),
            TicketFilter::Priority(priority) => Expr::col(Tickets::Priority).eq(priority.as_str()),
        }
    }
}

fn parse_column<T>(row: &SqliteRow, column: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let text: String = row.try_get(column)?;
    text.parse().map_err(|e: T::Err| StorageError::Corrupt {
        kind: Ticket::KIND,
        reason: e.to_string(),
    })
}
