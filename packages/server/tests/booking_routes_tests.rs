//! Integration tests for the booking endpoints.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use test_context::test_context;
use tower::ServiceExt;
use tour_core::common::{into_document, BookingId, TourId};
use tour_core::domains::bookings::Booking;

use crate::common::{
    create_test_tour, parse_json_response, test_request, test_request_json, unique_email,
    TestHarness,
};

#[test_context(TestHarness)]
#[tokio::test]
async fn place_booking_then_list_by_email(ctx: &TestHarness) {
    let package_id = create_test_tour(&ctx.db_pool, json!({ "title": "Bichanakandi" }))
        .await
        .unwrap();
    let email = unique_email("traveller");
    let app = ctx.app();

    let response = app
        .clone()
        .oneshot(test_request_json(
            "POST",
            &format!("/place-booking/{}", package_id),
            &json!({
                "bookingData": {
                    "userEmail": email,
                    "tourName": "Bichanakandi",
                    "status": "pending"
                }
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = parse_json_response(response).await;
    assert_eq!(body["acknowledged"], true);
    let booking_id: BookingId = body["insertedId"].as_str().unwrap().parse().unwrap();

    let stored = Booking::find_by_id(booking_id, &ctx.db_pool)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.package_id, Some(package_id));

    let response = app
        .oneshot(test_request("GET", &format!("/bookings?email={}", email)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bookings = parse_json_response(response).await;
    let bookings = bookings.as_array().unwrap();
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0]["_id"], booking_id.to_string().as_str());
    assert_eq!(bookings[0]["tourName"], "Bichanakandi");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn bookings_require_email_query(ctx: &TestHarness) {
    let response = ctx
        .app()
        .oneshot(test_request("GET", "/bookings"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn place_booking_requires_booking_data_object(ctx: &TestHarness) {
    let uri = format!("/place-booking/{}", TourId::new());
    let app = ctx.app();

    let response = app
        .clone()
        .oneshot(test_request_json("POST", &uri, &json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(test_request_json("POST", &uri, &json!({ "bookingData": "yes" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn confirming_a_booking_marks_it_completed(ctx: &TestHarness) {
    let package_id = create_test_tour(&ctx.db_pool, json!({ "title": "Tanguar Haor" }))
        .await
        .unwrap();
    let booking = Booking::create(
        package_id,
        into_document(json!({ "userEmail": unique_email("u"), "status": "pending" })).unwrap(),
        &ctx.db_pool,
    )
    .await
    .unwrap();
    let app = ctx.app();
    let uri = format!("/bookings/{}", booking.id);

    let response = app
        .clone()
        .oneshot(test_request("PATCH", &uri))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_json_response(response).await;
    assert_eq!(body["matchedCount"], 1);
    assert_eq!(body["modifiedCount"], 1);

    let stored = Booking::find_by_id(booking.id, &ctx.db_pool)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status(), Some("completed"));

    // Already completed: matched, nothing modified
    let response = app.oneshot(test_request("PATCH", &uri)).await.unwrap();
    let body = parse_json_response(response).await;
    assert_eq!(body["matchedCount"], 1);
    assert_eq!(body["modifiedCount"], 0);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn confirming_unknown_booking_matches_nothing(ctx: &TestHarness) {
    let response = ctx
        .app()
        .oneshot(test_request("PATCH", &format!("/bookings/{}", BookingId::new())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_json_response(response).await;
    assert_eq!(body["matchedCount"], 0);
    assert_eq!(body["modifiedCount"], 0);
}
