use serde::{Deserialize, Serialize};

use super::timestamp::UtcDateTime;

/// One shipment's current tracking state as reported by the API.
///
/// This is the canonical field list for the `trackings` stream. Every field
/// except the primary key is optional; unknown upstream fields are ignored.
/// `updated_at` is the replication field used to advance the bookmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tracking {
    pub id: String,
    pub created_at: Option<UtcDateTime>,
    pub updated_at: Option<UtcDateTime>,
    pub last_updated_at: Option<UtcDateTime>,
    pub tracking_number: Option<String>,
    pub slug: Option<String>,
    pub active: Option<bool>,
    pub android: Option<Vec<String>>,
    pub custom_fields: Option<CustomFields>,
    pub customer_name: Option<String>,
    pub destination_country_iso3: Option<String>,
    pub courier_destination_country_iso3: Option<String>,
    pub emails: Option<Vec<String>>,
    pub expected_delivery: Option<String>,
    pub ios: Option<Vec<String>>,
    pub note: Option<String>,
    pub order_id: Option<String>,
    pub order_id_path: Option<String>,
    pub order_date: Option<String>,
    pub origin_country_iso3: Option<String>,
    pub shipment_package_count: Option<i64>,
    pub shipment_pickup_date: Option<UtcDateTime>,
    pub shipment_delivery_date: Option<UtcDateTime>,
    pub shipment_type: Option<String>,
    pub shipment_weight: Option<f64>,
    pub shipment_weight_unit: Option<String>,
    pub signed_by: Option<String>,
    pub smses: Option<Vec<String>>,
    pub source: Option<String>,
    pub tag: Option<String>,
    pub subtag: Option<String>,
    pub subtag_message: Option<String>,
    pub title: Option<String>,
    pub tracked_count: Option<i64>,
    pub last_mile_tracking_supported: Option<bool>,
    pub language: Option<String>,
    pub unique_token: Option<String>,
    pub checkpoints: Option<Vec<TrackingCheckpoint>>,
    pub subscribed_smses: Option<Vec<String>>,
    pub subscribed_emails: Option<Vec<String>>,
    pub return_to_sender: Option<bool>,
    pub order_promised_delivery_date: Option<UtcDateTime>,
    pub delivery_type: Option<String>,
    pub pickup_location: Option<String>,
    pub pickup_note: Option<String>,
    pub courier_tracking_link: Option<String>,
    pub first_attempted_at: Option<UtcDateTime>,
    pub courier_redirect_link: Option<String>,
    pub order_tags: Option<Vec<String>>,
    pub order_number: Option<String>,
    pub aftership_estimated_delivery_date: Option<UtcDateTime>,
    pub destination_raw_location: Option<String>,
    pub latest_estimated_delivery: Option<EstimatedDelivery>,
    pub courier_connection_id: Option<serde_json::Value>,
    pub custom_estimated_delivery_date: Option<UtcDateTime>,
    pub origin_state: Option<String>,
    pub origin_city: Option<String>,
    pub origin_postal_code: Option<String>,
    pub origin_raw_location: Option<String>,
    pub destination_state: Option<String>,
    pub destination_city: Option<String>,
    pub destination_postal_code: Option<String>,
    pub shipment_tags: Option<Vec<String>>,
    pub next_couriers: Option<Vec<NextCourier>>,
    pub transit_time: Option<serde_json::Value>,
    pub carbon_emissions: Option<serde_json::Value>,
    pub shipping_method: Option<String>,
    pub location_id: Option<String>,
    pub on_time_status: Option<String>,
    pub on_time_difference: Option<String>,
    pub tracking_account_number: Option<String>,
    pub tracking_origin_country: Option<String>,
    pub tracking_destination_country: Option<String>,
    pub tracking_key: Option<String>,
    pub tracking_postal_code: Option<String>,
    pub tracking_ship_date: Option<String>,
    pub tracking_state: Option<String>,
}

impl Tracking {
    /// Value of the replication field, when the record carries one.
    pub fn replication_value(&self) -> Option<UtcDateTime> {
        self.updated_at
    }
}

/// Scan event recorded by a courier along the shipment's route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingCheckpoint {
    pub checkpoint_time: Option<UtcDateTime>,
    pub city: Option<String>,
    pub coordinates: Option<Vec<String>>,
    pub country_iso3: Option<String>,
    pub country_name: Option<String>,
    pub created_at: Option<UtcDateTime>,
    pub events: Option<Vec<CheckpointEvent>>,
    pub location: Option<String>,
    pub message: Option<String>,
    pub raw_tag: Option<String>,
    pub slug: Option<String>,
    pub state: Option<String>,
    pub subtag: Option<String>,
    pub subtag_message: Option<String>,
    pub tag: Option<String>,
    pub zip: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointEvent {
    pub code: Option<String>,
    pub reason: Option<serde_json::Value>,
}

/// Delivery estimate sub-object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatedDelivery {
    pub date: Option<String>,
    pub datetime_max: Option<UtcDateTime>,
    pub datetime_min: Option<UtcDateTime>,
    pub source: Option<String>,
    pub specific: Option<String>,
}

/// Handoff courier for multi-leg shipments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextCourier {
    pub slug: Option<String>,
    pub source: Option<String>,
    pub tracking_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomFields {
    pub item_names: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_minimal_record() {
        let record: Tracking = serde_json::from_str(
            r#"{"id":"trk-1","updated_at":"2024-01-05T10:00:00+08:00","tag":"InTransit"}"#,
        )
        .expect("minimal record must deserialize");

        assert_eq!(record.id, "trk-1");
        assert_eq!(
            record
                .replication_value()
                .expect("replication value present")
                .format_query(),
            "2024-01-05T02:00:00Z"
        );
        assert_eq!(record.tag.as_deref(), Some("InTransit"));
        assert!(record.checkpoints.is_none());
    }

    #[test]
    fn deserializes_nested_checkpoints() {
        let record: Tracking = serde_json::from_str(
            r#"{
                "id": "trk-2",
                "updated_at": "2024-01-05T10:00:00Z",
                "checkpoints": [{
                    "checkpoint_time": "2024-01-04T09:30:00Z",
                    "city": "Rotterdam",
                    "events": [{"code": "DELAYED", "reason": {"detail": "customs"}}],
                    "tag": "Exception"
                }],
                "next_couriers": [{"slug": "dhl", "tracking_number": "JD0001"}]
            }"#,
        )
        .expect("nested record must deserialize");

        let checkpoints = record.checkpoints.expect("checkpoints present");
        assert_eq!(checkpoints.len(), 1);
        assert_eq!(checkpoints[0].city.as_deref(), Some("Rotterdam"));
        let events = checkpoints[0].events.as_ref().expect("events present");
        assert_eq!(events[0].code.as_deref(), Some("DELAYED"));
        assert_eq!(
            record.next_couriers.expect("next couriers present")[0]
                .slug
                .as_deref(),
            Some("dhl")
        );
    }

    #[test]
    fn unknown_upstream_fields_are_ignored() {
        let record: Tracking = serde_json::from_str(
            r#"{"id":"trk-3","updated_at":"2024-01-05T10:00:00Z","brand_new_field":42}"#,
        )
        .expect("unknown fields must not fail deserialization");

        assert_eq!(record.id, "trk-3");
    }

    #[test]
    fn record_without_replication_field_yields_none() {
        let record: Tracking =
            serde_json::from_str(r#"{"id":"trk-4"}"#).expect("must deserialize");
        assert!(record.replication_value().is_none());
    }
}
