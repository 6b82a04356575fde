use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Comment, CommentId};
use crate::ports::TransportError;

// Wire format of the comments resource
#[derive(Debug, Serialize, Deserialize)]
pub struct CommentDto {
    pub id: i64,
    #[serde(default)]
    pub author: String,
    pub text: String,
    pub date: String, // ISO 8601
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub likes: i64,
}

// Request body for create and update
#[derive(Debug, Serialize)]
pub struct CommentTextDto<'a> {
    pub text: &'a str,
}

impl TryFrom<CommentDto> for Comment {
    type Error = TransportError;

    fn try_from(dto: CommentDto) -> Result<Self, Self::Error> {
        let date = DateTime::parse_from_rfc3339(&dto.date)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                TransportError::Decode(format!(
                    "Invalid date {:?} on comment {}: {}",
                    dto.date, dto.id, e
                ))
            })?;

        Ok(Self {
            id: CommentId(dto.id),
            author: dto.author,
            text: dto.text,
            date,
            image: dto.image.filter(|url| !url.is_empty()),
            likes: dto.likes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn dto(date: &str) -> CommentDto {
        serde_json::from_value(serde_json::json!({
            "id": 5,
            "author": "Admin",
            "text": "hi",
            "date": date,
            "image": "",
            "likes": 3
        }))
        .unwrap()
    }

    #[test]
    fn test_dto_conversion() {
        let comment = Comment::try_from(dto("2024-05-01T10:00:00Z")).unwrap();
        assert_eq!(comment.id, CommentId(5));
        assert_eq!(comment.likes, 3);
        assert_eq!(comment.image, None);
        assert_eq!(
            comment.date,
            Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_dto_accepts_offsets_and_fractions() {
        let comment = Comment::try_from(dto("2024-05-01T12:00:00.250+02:00")).unwrap();
        assert_eq!(
            comment.date.timestamp_millis(),
            Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap().timestamp_millis() + 250
        );
    }

    #[test]
    fn test_dto_rejects_bad_date() {
        let err = Comment::try_from(dto("yesterday")).unwrap_err();
        assert!(matches!(err, TransportError::Decode(_)));
    }

    #[test]
    fn test_optional_fields_default() {
        let dto: CommentDto = serde_json::from_value(serde_json::json!({
            "id": 9,
            "text": "bare",
            "date": "2024-05-01T10:00:00Z"
        }))
        .unwrap();
        let comment = Comment::try_from(dto).unwrap();
        assert_eq!(comment.author, "");
        assert_eq!(comment.likes, 0);
        assert_eq!(comment.image, None);
    }
}
