//! Domain models for the label catalog
//!
//! Relational rows map 1:1 to tables; document companion structs describe
//! the JSON metadata stored per entity. Payload types carry create/update
//! input, with `Patch` fields for clearable relations.

use chrono::NaiveDate;
use core_store::Patch;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// =============================================================================
// Lookup entities
// =============================================================================

/// Simple id+label entity (genre, country, status, gender)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Lookup {
    pub id: i64,
    pub label: String,
}

// =============================================================================
// Relational rows
// =============================================================================

/// Artist core row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Artist {
    /// Unique identifier
    pub id: i64,
    /// Display name, unique among artists
    pub name: String,
    /// Biography text
    pub biography: String,
    /// Profile photo URL
    pub photo_url: String,
    /// Genre relation
    pub genre_id: Option<i64>,
    /// Country relation
    pub country_id: Option<i64>,
    /// Status relation
    pub status_id: Option<i64>,
    /// Timestamps
    pub created_at: i64,
    pub updated_at: i64,
}

/// Event core row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: i64,
    /// Event name, unique among events
    pub name: String,
    pub description: String,
    /// Venue or location text
    pub venue: String,
    /// Calendar date of the event
    pub starts_on: NaiveDate,
    /// Start time as "HH:MM"
    pub starts_at_time: String,
    /// Venue capacity
    pub capacity: i64,
    /// Contact line for the organizer
    pub contact: String,
    /// Flyer image URL
    pub flyer_url: String,
    pub status_id: Option<i64>,
    pub genre_id: Option<i64>,
    /// Headline artist relation
    pub artist_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Manager core row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Manager {
    pub id: i64,
    /// Professional name, unique among managers
    pub stage_name: String,
    pub gender_id: Option<i64>,
    pub status_id: Option<i64>,
    /// When the manager registered with the label
    pub registered_at: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Album core row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Album {
    pub id: i64,
    /// Album title, unique among albums
    pub title: String,
    pub artist_id: Option<i64>,
    pub year: Option<i64>,
    pub genre_id: Option<i64>,
    pub status_id: Option<i64>,
    pub cover_url: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Song core row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Song {
    pub id: i64,
    /// Song title, unique among songs
    pub title: String,
    pub album_id: Option<i64>,
    pub artist_id: Option<i64>,
    /// Duration in seconds
    pub duration_secs: i64,
    pub year: Option<i64>,
    pub genre_id: Option<i64>,
    pub status_id: Option<i64>,
    pub cover_url: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Artist {
    /// Validate artist data
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Artist name cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Event {
    /// Validate event data
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Event name cannot be empty".to_string());
        }
        if self.capacity < 0 {
            return Err("Event capacity cannot be negative".to_string());
        }
        Ok(())
    }
}

impl Manager {
    /// Validate manager data
    pub fn validate(&self) -> Result<(), String> {
        if self.stage_name.trim().is_empty() {
            return Err("Manager stage name cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Album {
    /// Validate album data
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Album title cannot be empty".to_string());
        }
        if let Some(year) = self.year {
            if !(1900..=2100).contains(&year) {
                return Err(format!("Album year {} is out of valid range", year));
            }
        }
        Ok(())
    }
}

impl Song {
    /// Validate song data
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Song title cannot be empty".to_string());
        }
        if self.duration_secs < 0 {
            return Err("Song duration cannot be negative".to_string());
        }
        if let Some(year) = self.year {
            if !(1900..=2100).contains(&year) {
                return Err(format!("Song year {} is out of valid range", year));
            }
        }
        Ok(())
    }
}

// =============================================================================
// Document companions
// =============================================================================

/// Technical rider section of artist metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TechnicalRider {
    pub audio_equipment: Vec<String>,
    pub lighting: Vec<String>,
    pub catering: String,
    pub lodging: String,
    pub transport: String,
    pub other_requirements: String,
}

/// One external release in an artist's discography
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscographyEntry {
    pub title: String,
    pub year: Option<i64>,
    pub label: String,
    pub platform: String,
}

/// Aggregated artist statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtistStats {
    pub total_plays: i64,
    pub total_followers: i64,
    pub concerts_played: i64,
}

/// A milestone date in an artist's history
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyDate {
    pub event: String,
    pub date: String,
    pub description: String,
}

/// Artist document companion
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtistMetadata {
    pub social_links: Vec<String>,
    pub technical_rider: TechnicalRider,
    pub secondary_genres: Vec<String>,
    pub manager_contact: String,
    pub external_discography: Vec<DiscographyEntry>,
    pub stats: ArtistStats,
    pub key_dates: Vec<KeyDate>,
}

/// Ticket price tiers for an event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TicketPricing {
    pub general: f64,
    pub vip: f64,
    pub student: f64,
}

/// Technical requirements section of event metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TechnicalRequirements {
    pub sound: Vec<String>,
    pub lighting: Vec<String>,
    pub stage: String,
    pub other: String,
}

/// Attendance policies for an event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventPolicies {
    pub minimum_age: i64,
    pub prohibited_items: Vec<String>,
    pub refunds: String,
}

/// Aggregated event statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventStats {
    pub tickets_sold: i64,
    pub confirmed_attendees: i64,
    pub revenue: f64,
}

/// Event document companion
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventMetadata {
    pub guest_artists: Vec<String>,
    pub attachments: Vec<String>,
    pub ticket_pricing: TicketPricing,
    pub technical_requirements: TechnicalRequirements,
    pub sponsors: String,
    pub policies: EventPolicies,
    pub stats: EventStats,
}

/// Per-network social links of a manager
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialLinks {
    pub instagram: String,
    pub twitter: String,
    pub facebook: String,
    pub linkedin: String,
    pub youtube: String,
    pub tiktok: String,
}

/// Professional contact section of manager metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfessionalContact {
    pub phone: String,
    pub email: String,
    pub office_address: String,
    pub office_hours: String,
}

/// Specialties section of manager metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Specialties {
    pub music_genres: Vec<String>,
    pub services_offered: Vec<String>,
    pub languages: Vec<String>,
}

/// Aggregated manager statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerStats {
    pub years_experience: i64,
    pub total_artists_managed: i64,
    pub events_organized: i64,
    pub deals_closed: i64,
}

/// A professional certification held by a manager
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Certification {
    pub name: String,
    pub institution: String,
    pub obtained_on: String,
    pub valid_until: String,
}

/// Manager document companion
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerMetadata {
    pub biography: String,
    pub profile_image_url: String,
    pub experience: String,
    pub social_links: SocialLinks,
    pub extra_notes: String,
    pub managed_artists: Vec<String>,
    pub professional_contact: ProfessionalContact,
    pub specialties: Specialties,
    pub stats: ManagerStats,
    pub certifications: Vec<Certification>,
}

// =============================================================================
// Metadata patches
// =============================================================================

/// Client-settable artist metadata fields.
///
/// A field that is `Some` was explicitly supplied, even if the value is an
/// empty array; `None` means absent. Serialization drops absent fields so an
/// upsert only touches what was supplied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArtistMetadataPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_links: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_rider: Option<TechnicalRider>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_genres: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_discography: Option<Vec<DiscographyEntry>>,
}

impl ArtistMetadataPatch {
    /// Explicit presence check across the metadata field list
    pub fn is_empty(&self) -> bool {
        self.social_links.is_none()
            && self.technical_rider.is_none()
            && self.secondary_genres.is_none()
            && self.manager_contact.is_none()
            && self.external_discography.is_none()
    }

    /// Build a full document for the create path, defaulting every omitted
    /// field
    pub fn into_document(self) -> ArtistMetadata {
        ArtistMetadata {
            social_links: self.social_links.unwrap_or_default(),
            technical_rider: self.technical_rider.unwrap_or_default(),
            secondary_genres: self.secondary_genres.unwrap_or_default(),
            manager_contact: self.manager_contact.unwrap_or_default(),
            external_discography: self.external_discography.unwrap_or_default(),
            ..ArtistMetadata::default()
        }
    }
}

/// Client-settable event metadata fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventMetadataPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_artists: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_pricing: Option<TicketPricing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_requirements: Option<TechnicalRequirements>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sponsors: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policies: Option<EventPolicies>,
}

impl EventMetadataPatch {
    pub fn is_empty(&self) -> bool {
        self.guest_artists.is_none()
            && self.attachments.is_none()
            && self.ticket_pricing.is_none()
            && self.technical_requirements.is_none()
            && self.sponsors.is_none()
            && self.policies.is_none()
    }

    pub fn into_document(self) -> EventMetadata {
        EventMetadata {
            guest_artists: self.guest_artists.unwrap_or_default(),
            attachments: self.attachments.unwrap_or_default(),
            ticket_pricing: self.ticket_pricing.unwrap_or_default(),
            technical_requirements: self.technical_requirements.unwrap_or_default(),
            sponsors: self.sponsors.unwrap_or_default(),
            policies: self.policies.unwrap_or_default(),
            ..EventMetadata::default()
        }
    }
}

/// Client-settable manager metadata fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManagerMetadataPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biography: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_links: Option<SocialLinks>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managed_artists: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub professional_contact: Option<ProfessionalContact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialties: Option<Specialties>,
}

impl ManagerMetadataPatch {
    pub fn is_empty(&self) -> bool {
        self.biography.is_none()
            && self.profile_image_url.is_none()
            && self.experience.is_none()
            && self.social_links.is_none()
            && self.extra_notes.is_none()
            && self.managed_artists.is_none()
            && self.professional_contact.is_none()
            && self.specialties.is_none()
    }

    pub fn into_document(self) -> ManagerMetadata {
        ManagerMetadata {
            biography: self.biography.unwrap_or_default(),
            profile_image_url: self.profile_image_url.unwrap_or_default(),
            experience: self.experience.unwrap_or_default(),
            social_links: self.social_links.unwrap_or_default(),
            extra_notes: self.extra_notes.unwrap_or_default(),
            managed_artists: self.managed_artists.unwrap_or_default(),
            professional_contact: self.professional_contact.unwrap_or_default(),
            specialties: self.specialties.unwrap_or_default(),
            ..ManagerMetadata::default()
        }
    }
}

// =============================================================================
// Create / update payloads
// =============================================================================

/// Create payload for an artist
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewArtist {
    pub name: String,
    #[serde(default)]
    pub biography: String,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub genre_id: Option<i64>,
    #[serde(default)]
    pub country_id: Option<i64>,
    #[serde(default)]
    pub status_id: Option<i64>,
    #[serde(default)]
    pub metadata: ArtistMetadataPatch,
}

/// Partial-update payload for an artist
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArtistUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub biography: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub genre_id: Patch<i64>,
    #[serde(default)]
    pub country_id: Patch<i64>,
    #[serde(default)]
    pub status_id: Patch<i64>,
    #[serde(default)]
    pub metadata: ArtistMetadataPatch,
}

impl ArtistUpdate {
    /// Whether any relational field was supplied
    pub fn has_core_changes(&self) -> bool {
        self.name.is_some()
            || self.biography.is_some()
            || self.photo_url.is_some()
            || self.genre_id.is_set()
            || self.country_id.is_set()
            || self.status_id.is_set()
    }
}

/// Create payload for an event
#[derive(Debug, Clone, Deserialize)]
pub struct NewEvent {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub venue: String,
    pub starts_on: NaiveDate,
    #[serde(default)]
    pub starts_at_time: String,
    #[serde(default)]
    pub capacity: i64,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub flyer_url: Option<String>,
    #[serde(default)]
    pub status_id: Option<i64>,
    #[serde(default)]
    pub genre_id: Option<i64>,
    #[serde(default)]
    pub artist_id: Option<i64>,
    #[serde(default)]
    pub metadata: EventMetadataPatch,
}

/// Partial-update payload for an event
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub starts_on: Option<NaiveDate>,
    #[serde(default)]
    pub starts_at_time: Option<String>,
    #[serde(default)]
    pub capacity: Option<i64>,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub flyer_url: Option<String>,
    #[serde(default)]
    pub status_id: Patch<i64>,
    #[serde(default)]
    pub genre_id: Patch<i64>,
    #[serde(default)]
    pub artist_id: Patch<i64>,
    #[serde(default)]
    pub metadata: EventMetadataPatch,
}

impl EventUpdate {
    pub fn has_core_changes(&self) -> bool {
        self.name.is_some()
            || self.description.is_some()
            || self.venue.is_some()
            || self.starts_on.is_some()
            || self.starts_at_time.is_some()
            || self.capacity.is_some()
            || self.contact.is_some()
            || self.flyer_url.is_some()
            || self.status_id.is_set()
            || self.genre_id.is_set()
            || self.artist_id.is_set()
    }
}

/// Create payload for a manager
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewManager {
    pub stage_name: String,
    #[serde(default)]
    pub gender_id: Option<i64>,
    #[serde(default)]
    pub status_id: Option<i64>,
    #[serde(default)]
    pub metadata: ManagerMetadataPatch,
}

/// Partial-update payload for a manager
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ManagerUpdate {
    #[serde(default)]
    pub stage_name: Option<String>,
    #[serde(default)]
    pub gender_id: Patch<i64>,
    #[serde(default)]
    pub status_id: Patch<i64>,
    #[serde(default)]
    pub metadata: ManagerMetadataPatch,
}

impl ManagerUpdate {
    pub fn has_core_changes(&self) -> bool {
        self.stage_name.is_some() || self.gender_id.is_set() || self.status_id.is_set()
    }
}

/// Create payload for an album
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewAlbum {
    pub title: String,
    #[serde(default)]
    pub artist_id: Option<i64>,
    #[serde(default)]
    pub year: Option<i64>,
    #[serde(default)]
    pub genre_id: Option<i64>,
    #[serde(default)]
    pub status_id: Option<i64>,
    #[serde(default)]
    pub cover_url: Option<String>,
}

/// Partial-update payload for an album
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlbumUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist_id: Patch<i64>,
    #[serde(default)]
    pub year: Option<i64>,
    #[serde(default)]
    pub genre_id: Patch<i64>,
    #[serde(default)]
    pub status_id: Patch<i64>,
    #[serde(default)]
    pub cover_url: Option<String>,
}

impl AlbumUpdate {
    pub fn has_changes(&self) -> bool {
        self.title.is_some()
            || self.artist_id.is_set()
            || self.year.is_some()
            || self.genre_id.is_set()
            || self.status_id.is_set()
            || self.cover_url.is_some()
    }
}

/// Create payload for a song
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewSong {
    pub title: String,
    #[serde(default)]
    pub album_id: Option<i64>,
    #[serde(default)]
    pub artist_id: Option<i64>,
    #[serde(default)]
    pub duration_secs: i64,
    #[serde(default)]
    pub year: Option<i64>,
    #[serde(default)]
    pub genre_id: Option<i64>,
    #[serde(default)]
    pub status_id: Option<i64>,
    #[serde(default)]
    pub cover_url: Option<String>,
}

/// Partial-update payload for a song
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SongUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub album_id: Patch<i64>,
    #[serde(default)]
    pub artist_id: Patch<i64>,
    #[serde(default)]
    pub duration_secs: Option<i64>,
    #[serde(default)]
    pub year: Option<i64>,
    #[serde(default)]
    pub genre_id: Patch<i64>,
    #[serde(default)]
    pub status_id: Patch<i64>,
    #[serde(default)]
    pub cover_url: Option<String>,
}

impl SongUpdate {
    pub fn has_changes(&self) -> bool {
        self.title.is_some()
            || self.album_id.is_set()
            || self.artist_id.is_set()
            || self.duration_secs.is_some()
            || self.year.is_some()
            || self.genre_id.is_set()
            || self.status_id.is_set()
            || self.cover_url.is_some()
    }
}

// =============================================================================
// Read models
// =============================================================================

/// Relational row with its foreign-key relations resolved
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtistRecord {
    #[serde(flatten)]
    pub artist: Artist,
    pub genre: Option<Lookup>,
    pub country: Option<Lookup>,
    pub status: Option<Lookup>,
}

/// Unified artist read model; `metadata` is entirely absent when no
/// companion document exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtistResponse {
    #[serde(flatten)]
    pub record: ArtistRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ArtistMetadata>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
    #[serde(flatten)]
    pub event: Event,
    pub status: Option<Lookup>,
    pub genre: Option<Lookup>,
    /// Headline artist name when the relation is set
    pub artist_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventResponse {
    #[serde(flatten)]
    pub record: EventRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<EventMetadata>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManagerRecord {
    #[serde(flatten)]
    pub manager: Manager,
    pub gender: Option<Lookup>,
    pub status: Option<Lookup>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManagerResponse {
    #[serde(flatten)]
    pub record: ManagerRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ManagerMetadata>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_artist_validation() {
        let mut artist = Artist {
            id: 1,
            name: "Valid Artist".to_string(),
            biography: String::new(),
            photo_url: String::new(),
            genre_id: None,
            country_id: None,
            status_id: None,
            created_at: 0,
            updated_at: 0,
        };
        assert!(artist.validate().is_ok());

        artist.name = "   ".to_string();
        assert!(artist.validate().is_err());
    }

    #[test]
    fn test_album_year_range() {
        let mut album = Album {
            id: 1,
            title: "Debut".to_string(),
            artist_id: None,
            year: Some(2020),
            genre_id: None,
            status_id: None,
            cover_url: String::new(),
            created_at: 0,
            updated_at: 0,
        };
        assert!(album.validate().is_ok());

        album.year = Some(1800);
        assert!(album.validate().is_err());

        album.year = Some(2200);
        assert!(album.validate().is_err());
    }

    #[test]
    fn test_metadata_patch_presence() {
        let empty = ArtistMetadataPatch::default();
        assert!(empty.is_empty());

        // An explicitly supplied empty array still counts as present.
        let with_empty_array = ArtistMetadataPatch {
            social_links: Some(vec![]),
            ..Default::default()
        };
        assert!(!with_empty_array.is_empty());
    }

    #[test]
    fn test_metadata_patch_into_document_defaults_omitted() {
        let patch = ArtistMetadataPatch {
            manager_contact: Some("booking@label.test".to_string()),
            ..Default::default()
        };
        let doc = patch.into_document();

        assert_eq!(doc.manager_contact, "booking@label.test");
        assert!(doc.social_links.is_empty());
        assert_eq!(doc.technical_rider, TechnicalRider::default());
        assert_eq!(doc.stats, ArtistStats::default());
    }

    #[test]
    fn test_metadata_patch_serializes_only_supplied_fields() {
        let patch = ArtistMetadataPatch {
            secondary_genres: Some(vec!["cumbia".to_string()]),
            ..Default::default()
        };
        let value = serde_json::to_value(&patch).unwrap();
        assert_eq!(value, json!({"secondary_genres": ["cumbia"]}));
    }

    #[test]
    fn test_metadata_deserializes_partial_documents() {
        // Documents written from an update may hold only patched fields.
        let doc: ArtistMetadata =
            serde_json::from_value(json!({"manager_contact": "x"})).unwrap();
        assert_eq!(doc.manager_contact, "x");
        assert!(doc.social_links.is_empty());
    }

    #[test]
    fn test_update_payload_patch_fields() {
        let update: ArtistUpdate =
            serde_json::from_value(json!({"genre_id": null, "name": "Neón"})).unwrap();
        assert_eq!(update.genre_id, Patch::Null);
        assert_eq!(update.country_id, Patch::Unset);
        assert_eq!(update.name.as_deref(), Some("Neón"));
        assert!(update.has_core_changes());

        let untouched: ArtistUpdate = serde_json::from_value(json!({})).unwrap();
        assert!(!untouched.has_core_changes());
    }

    #[test]
    fn test_response_metadata_absent_not_empty() {
        let record = ArtistRecord {
            artist: Artist {
                id: 1,
                name: "Neón".to_string(),
                biography: String::new(),
                photo_url: String::new(),
                genre_id: None,
                country_id: None,
                status_id: None,
                created_at: 0,
                updated_at: 0,
            },
            genre: None,
            country: None,
            status: None,
        };
        let response = ArtistResponse {
            record,
            metadata: None,
        };

        let value = serde_json::to_value(&response).unwrap();
        assert!(value.get("metadata").is_none());
    }
}
