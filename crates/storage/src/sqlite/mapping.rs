use reading_core::model::{
    Book, BookId, BookStatus, Genre, GenreId, Goal, GoalId, GoalType, ListId, ReadingList,
    ReadingSession, SessionId,
};
use sqlx::Row;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

fn i64_to_u32(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn book_id_from_i64(v: i64) -> Result<BookId, StorageError> {
    Ok(BookId::new(i64_to_u64("book_id", v)?))
}

pub(crate) fn session_id_from_i64(v: i64) -> Result<SessionId, StorageError> {
    Ok(SessionId::new(i64_to_u64("session_id", v)?))
}

pub(crate) fn goal_id_from_i64(v: i64) -> Result<GoalId, StorageError> {
    Ok(GoalId::new(i64_to_u64("goal_id", v)?))
}

pub(crate) fn genre_id_from_i64(v: i64) -> Result<GenreId, StorageError> {
    Ok(GenreId::new(i64_to_u64("genre_id", v)?))
}

pub(crate) fn list_id_from_i64(v: i64) -> Result<ListId, StorageError> {
    Ok(ListId::new(i64_to_u64("list_id", v)?))
}

pub(crate) fn id_to_i64(field: &'static str, value: u64) -> Result<i64, StorageError> {
    i64::try_from(value)
        .map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

/// Converts a `BookStatus` to its storage representation.
/// This must stay consistent with `parse_book_status`.
pub(crate) fn status_to_str(status: BookStatus) -> &'static str {
    status.as_str()
}

pub(crate) fn parse_book_status(s: &str) -> Result<BookStatus, StorageError> {
    match s {
        "not_started" => Ok(BookStatus::NotStarted),
        "in_progress" => Ok(BookStatus::InProgress),
        "completed" => Ok(BookStatus::Completed),
        _ => Err(StorageError::Serialization(format!("invalid status: {s}"))),
    }
}

/// Converts a `GoalType` to its storage representation.
/// This must stay consistent with `parse_goal_type`.
pub(crate) fn goal_type_to_str(goal_type: GoalType) -> &'static str {
    goal_type.as_str()
}

pub(crate) fn parse_goal_type(s: &str) -> Result<GoalType, StorageError> {
    s.parse::<GoalType>().map_err(ser)
}

pub(crate) fn map_book_row(row: &sqlx::sqlite::SqliteRow) -> Result<Book, StorageError> {
    let status_str: String = row.try_get("status").map_err(ser)?;
    let status = parse_book_status(status_str.as_str())?;

    let genre_id = row
        .try_get::<Option<i64>, _>("genre_id")
        .map_err(ser)?
        .map(genre_id_from_i64)
        .transpose()?;

    let personal_rating = row
        .try_get::<Option<i64>, _>("personal_rating")
        .map_err(ser)?
        .map(|v| {
            u8::try_from(v)
                .map_err(|_| StorageError::Serialization(format!("invalid rating: {v}")))
        })
        .transpose()?;

    Book::from_persisted(
        book_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        row.try_get("title").map_err(ser)?,
        row.try_get("author").map_err(ser)?,
        row.try_get::<Option<i64>, _>("publication_year")
            .map_err(ser)?
            .map(|v| {
                i32::try_from(v).map_err(|_| {
                    StorageError::Serialization(format!("invalid publication_year: {v}"))
                })
            })
            .transpose()?,
        genre_id,
        i64_to_u32(
            "total_pages",
            row.try_get::<i64, _>("total_pages").map_err(ser)?,
        )?,
        row.try_get("cover_url").map_err(ser)?,
        row.try_get("isbn").map_err(ser)?,
        row.try_get("description").map_err(ser)?,
        status,
        personal_rating,
        i64_to_u32(
            "current_page",
            row.try_get::<i64, _>("current_page").map_err(ser)?,
        )?,
        row.try_get("started_at").map_err(ser)?,
        row.try_get("completed_at").map_err(ser)?,
        row.try_get("created_at").map_err(ser)?,
        row.try_get("updated_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_session_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<ReadingSession, StorageError> {
    let start_page = row
        .try_get::<Option<i64>, _>("start_page")
        .map_err(ser)?
        .map(|v| i64_to_u32("start_page", v))
        .transpose()?;
    let end_page = row
        .try_get::<Option<i64>, _>("end_page")
        .map_err(ser)?
        .map(|v| i64_to_u32("end_page", v))
        .transpose()?;

    ReadingSession::from_persisted(
        session_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        book_id_from_i64(row.try_get::<i64, _>("book_id").map_err(ser)?)?,
        row.try_get("session_date").map_err(ser)?,
        i64_to_u32(
            "pages_read",
            row.try_get::<i64, _>("pages_read").map_err(ser)?,
        )?,
        start_page,
        end_page,
        i64_to_u32(
            "duration_minutes",
            row.try_get::<i64, _>("duration_minutes").map_err(ser)?,
        )?,
        row.try_get("notes").map_err(ser)?,
        row.try_get("created_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_goal_row(row: &sqlx::sqlite::SqliteRow) -> Result<Goal, StorageError> {
    let type_str: String = row.try_get("goal_type").map_err(ser)?;
    Goal::new(
        goal_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        parse_goal_type(type_str.as_str())?,
        i64_to_u32(
            "target_value",
            row.try_get::<i64, _>("target_value").map_err(ser)?,
        )?,
        row.try_get("period_start").map_err(ser)?,
        row.try_get("period_end").map_err(ser)?,
        row.try_get::<i64, _>("is_active").map_err(ser)? != 0,
        row.try_get("created_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_genre_row(row: &sqlx::sqlite::SqliteRow) -> Result<Genre, StorageError> {
    Genre::new(
        genre_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        row.try_get::<String, _>("name").map_err(ser)?,
        row.try_get::<String, _>("color").map_err(ser)?,
        row.try_get::<i64, _>("is_default").map_err(ser)? != 0,
        row.try_get("created_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_list_row(row: &sqlx::sqlite::SqliteRow) -> Result<ReadingList, StorageError> {
    ReadingList::new(
        list_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        row.try_get::<String, _>("name").map_err(ser)?,
        row.try_get("description").map_err(ser)?,
        row.try_get::<String, _>("color").map_err(ser)?,
        row.try_get("created_at").map_err(ser)?,
    )
    .map_err(ser)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codec_roundtrip() {
        for status in [
            BookStatus::NotStarted,
            BookStatus::InProgress,
            BookStatus::Completed,
        ] {
            assert_eq!(parse_book_status(status_to_str(status)).unwrap(), status);
        }
        assert!(parse_book_status("reading").is_err());
    }

    #[test]
    fn goal_type_codec_roundtrip() {
        for goal_type in [
            GoalType::DailyPages,
            GoalType::MonthlyBooks,
            GoalType::YearlyBooks,
        ] {
            assert_eq!(
                parse_goal_type(goal_type_to_str(goal_type)).unwrap(),
                goal_type
            );
        }
        assert!(parse_goal_type("weekly_books").is_err());
    }
}
