mod helpers;

use chrono::{Duration, Utc};
use helpers::{future_time, past_time, seed_salon, spawn_app, STYLIST_PASSWORD};

fn booking_body(salon: &helpers::Salon, time: &str) -> serde_json::Value {
    serde_json::json!({
        "stylist_id": salon.stylist_id,
        "service_id": salon.service_id,
        "appointment_time": time,
    })
}

#[tokio::test]
async fn create_checks_preconditions_in_order() {
    let app = spawn_app().await;
    let salon = seed_salon(&app).await;
    let time = future_time(24);

    let unknown_service = app
        .post(
            "/bookings/create",
            Some(&salon.client_token),
            &serde_json::json!({
                "stylist_id": salon.stylist_id,
                "service_id": 9999,
                "appointment_time": time,
            }),
        )
        .await;
    assert_eq!(404, unknown_service.status().as_u16());
    let body: serde_json::Value = unknown_service.json().await.unwrap();
    assert_eq!("Service not found", body["detail"]);

    let unknown_stylist = app
        .post(
            "/bookings/create",
            Some(&salon.client_token),
            &serde_json::json!({
                "stylist_id": 9999,
                "service_id": salon.service_id,
                "appointment_time": time,
            }),
        )
        .await;
    assert_eq!(404, unknown_stylist.status().as_u16());

    // A second service the stylist does not offer.
    let other_service = app.create_service(&salon.admin_token, "Beard Trim").await;
    let not_offered = app
        .post(
            "/bookings/create",
            Some(&salon.client_token),
            &serde_json::json!({
                "stylist_id": salon.stylist_id,
                "service_id": other_service,
                "appointment_time": time,
            }),
        )
        .await;
    assert_eq!(400, not_offered.status().as_u16());
    let body: serde_json::Value = not_offered.json().await.unwrap();
    assert_eq!("stylist does not offer this service", body["detail"]);

    assert_eq!(0, app.booking_count().await);
}

#[tokio::test]
async fn past_appointment_times_are_rejected_and_nothing_is_persisted() {
    let app = spawn_app().await;
    let salon = seed_salon(&app).await;

    let response = app
        .post(
            "/bookings/create",
            Some(&salon.client_token),
            &booking_body(&salon, &past_time(1)),
        )
        .await;
    assert_eq!(400, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!("appointment time must be in the future", body["detail"]);

    assert_eq!(0, app.booking_count().await);
}

#[tokio::test]
async fn full_lifecycle_book_accept_complete_delete() {
    let app = spawn_app().await;
    let salon = seed_salon(&app).await;

    let response = app
        .post(
            "/bookings/create",
            Some(&salon.client_token),
            &booking_body(&salon, &future_time(24)),
        )
        .await;
    assert_eq!(201, response.status().as_u16());
    let booking: serde_json::Value = response.json().await.unwrap();
    assert_eq!("pending", booking["status"]);
    assert_eq!("selena", booking["stylist_name"]);
    assert_eq!("Haircut", booking["service_name"]);
    let booking_id = booking["id"].as_i64().unwrap();

    let accepted = app
        .post(
            &format!("/bookings/accept/{booking_id}"),
            Some(&salon.stylist_token),
            &serde_json::json!({}),
        )
        .await;
    assert_eq!(200, accepted.status().as_u16());
    let body: serde_json::Value = accepted.json().await.unwrap();
    assert_eq!("confirmed", body["status"]);

    let completed = app
        .post(
            &format!("/bookings/complete/{booking_id}"),
            Some(&salon.stylist_token),
            &serde_json::json!({}),
        )
        .await;
    assert_eq!(200, completed.status().as_u16());
    let body: serde_json::Value = completed.json().await.unwrap();
    assert_eq!("completed", body["status"]);

    // Deletion is gated on ownership only, not on status.
    let deleted = app
        .delete(
            &format!("/bookings/delete/{booking_id}"),
            Some(&salon.client_token),
        )
        .await;
    assert_eq!(204, deleted.status().as_u16());
    assert_eq!(0, app.booking_count().await);
}

#[tokio::test]
async fn a_confirmed_slot_conflicts_until_it_is_freed() {
    let app = spawn_app().await;
    let salon = seed_salon(&app).await;
    let time = future_time(24);

    let first = app
        .post(
            "/bookings/create",
            Some(&salon.client_token),
            &booking_body(&salon, &time),
        )
        .await;
    let first: serde_json::Value = first.json().await.unwrap();
    let first_id = first["id"].as_i64().unwrap();

    app.post(
        &format!("/bookings/accept/{first_id}"),
        Some(&salon.stylist_token),
        &serde_json::json!({}),
    )
    .await;

    let other_client = app.signup_client("robin").await;
    let conflicting = app
        .post(
            "/bookings/create",
            Some(&other_client),
            &booking_body(&salon, &time),
        )
        .await;
    assert_eq!(409, conflicting.status().as_u16());
    let body: serde_json::Value = conflicting.json().await.unwrap();
    assert_eq!("stylist already booked at this time", body["detail"]);

    // A different slot is fine.
    let elsewhere = app
        .post(
            "/bookings/create",
            Some(&other_client),
            &booking_body(&salon, &future_time(25)),
        )
        .await;
    assert_eq!(201, elsewhere.status().as_u16());
}

#[tokio::test]
async fn a_rejected_booking_frees_its_slot_for_retry() {
    let app = spawn_app().await;
    let salon = seed_salon(&app).await;
    let time = future_time(30);

    let first = app
        .post(
            "/bookings/create",
            Some(&salon.client_token),
            &booking_body(&salon, &time),
        )
        .await;
    let first: serde_json::Value = first.json().await.unwrap();
    let first_id = first["id"].as_i64().unwrap();

    let rejected = app
        .post(
            &format!("/bookings/reject/{first_id}"),
            Some(&salon.stylist_token),
            &serde_json::json!({}),
        )
        .await;
    assert_eq!(200, rejected.status().as_u16());

    let other_client = app.signup_client("robin").await;
    let retry = app
        .post(
            "/bookings/create",
            Some(&other_client),
            &booking_body(&salon, &time),
        )
        .await;
    assert_eq!(201, retry.status().as_u16());
}

#[tokio::test]
async fn pending_bookings_may_share_a_slot() {
    let app = spawn_app().await;
    let salon = seed_salon(&app).await;
    let time = future_time(24);

    let first = app
        .post(
            "/bookings/create",
            Some(&salon.client_token),
            &booking_body(&salon, &time),
        )
        .await;
    assert_eq!(201, first.status().as_u16());

    let other_client = app.signup_client("robin").await;
    let second = app
        .post(
            "/bookings/create",
            Some(&other_client),
            &booking_body(&salon, &time),
        )
        .await;
    assert_eq!(201, second.status().as_u16());
}

#[tokio::test]
async fn illegal_transitions_are_rejected() {
    let app = spawn_app().await;
    let salon = seed_salon(&app).await;

    let booking = app
        .post(
            "/bookings/create",
            Some(&salon.client_token),
            &booking_body(&salon, &future_time(24)),
        )
        .await;
    let booking: serde_json::Value = booking.json().await.unwrap();
    let booking_id = booking["id"].as_i64().unwrap();

    // pending -> completed skips confirmation.
    let skip = app
        .post(
            &format!("/bookings/complete/{booking_id}"),
            Some(&salon.stylist_token),
            &serde_json::json!({}),
        )
        .await;
    assert_eq!(400, skip.status().as_u16());
    let body: serde_json::Value = skip.json().await.unwrap();
    assert_eq!("booking must be confirmed before completion", body["detail"]);

    app.post(
        &format!("/bookings/accept/{booking_id}"),
        Some(&salon.stylist_token),
        &serde_json::json!({}),
    )
    .await;

    // confirmed -> confirmed and confirmed -> rejected are both dead ends.
    let again = app
        .post(
            &format!("/bookings/accept/{booking_id}"),
            Some(&salon.stylist_token),
            &serde_json::json!({}),
        )
        .await;
    assert_eq!(400, again.status().as_u16());

    let late_reject = app
        .post(
            &format!("/bookings/reject/{booking_id}"),
            Some(&salon.stylist_token),
            &serde_json::json!({}),
        )
        .await;
    assert_eq!(400, late_reject.status().as_u16());

    app.post(
        &format!("/bookings/complete/{booking_id}"),
        Some(&salon.stylist_token),
        &serde_json::json!({}),
    )
    .await;

    // completed is terminal.
    let revive = app
        .post(
            &format!("/bookings/accept/{booking_id}"),
            Some(&salon.stylist_token),
            &serde_json::json!({}),
        )
        .await;
    assert_eq!(400, revive.status().as_u16());

    let complete_twice = app
        .post(
            &format!("/bookings/complete/{booking_id}"),
            Some(&salon.stylist_token),
            &serde_json::json!({}),
        )
        .await;
    assert_eq!(400, complete_twice.status().as_u16());
    let body: serde_json::Value = complete_twice.json().await.unwrap();
    assert_eq!("booking is already completed", body["detail"]);
}

#[tokio::test]
async fn only_the_assigned_stylist_may_transition() {
    let app = spawn_app().await;
    let salon = seed_salon(&app).await;

    let booking = app
        .post(
            "/bookings/create",
            Some(&salon.client_token),
            &booking_body(&salon, &future_time(24)),
        )
        .await;
    let booking: serde_json::Value = booking.json().await.unwrap();
    let booking_id = booking["id"].as_i64().unwrap();

    app.create_stylist(&salon.admin_token, "marta", &[]).await;
    let other_stylist = app.login("marta", STYLIST_PASSWORD).await;

    let response = app
        .post(
            &format!("/bookings/accept/{booking_id}"),
            Some(&other_stylist),
            &serde_json::json!({}),
        )
        .await;
    assert_eq!(403, response.status().as_u16());

    // Admin overrides are not bound to the assignment.
    let response = app
        .post(
            &format!("/admins/bookings/accept/{booking_id}"),
            Some(&salon.admin_token),
            &serde_json::json!({}),
        )
        .await;
    assert_eq!(200, response.status().as_u16());
}

#[tokio::test]
async fn reschedule_is_for_pending_bookings_of_the_owner_only() {
    let app = spawn_app().await;
    let salon = seed_salon(&app).await;

    let booking = app
        .post(
            "/bookings/create",
            Some(&salon.client_token),
            &booking_body(&salon, &future_time(24)),
        )
        .await;
    let booking: serde_json::Value = booking.json().await.unwrap();
    let booking_id = booking["id"].as_i64().unwrap();

    let not_owner = app.signup_client("robin").await;
    let response = app
        .put(
            "/bookings/update",
            Some(&not_owner),
            &serde_json::json!({ "booking_id": booking_id, "appointment_time": future_time(26) }),
        )
        .await;
    assert_eq!(403, response.status().as_u16());

    let into_the_past = app
        .put(
            "/bookings/update",
            Some(&salon.client_token),
            &serde_json::json!({ "booking_id": booking_id, "appointment_time": past_time(1) }),
        )
        .await;
    assert_eq!(400, into_the_past.status().as_u16());

    let moved = app
        .put(
            "/bookings/update",
            Some(&salon.client_token),
            &serde_json::json!({ "booking_id": booking_id, "appointment_time": future_time(26) }),
        )
        .await;
    assert_eq!(200, moved.status().as_u16());
    let body: serde_json::Value = moved.json().await.unwrap();
    assert_eq!("pending", body["status"]);

    app.post(
        &format!("/bookings/accept/{booking_id}"),
        Some(&salon.stylist_token),
        &serde_json::json!({}),
    )
    .await;

    let after_accept = app
        .put(
            "/bookings/update",
            Some(&salon.client_token),
            &serde_json::json!({ "booking_id": booking_id, "appointment_time": future_time(27) }),
        )
        .await;
    assert_eq!(400, after_accept.status().as_u16());
    let body: serde_json::Value = after_accept.json().await.unwrap();
    assert_eq!(
        "booking already confirmed/completed, create a new booking instead",
        body["detail"]
    );
}

#[tokio::test]
async fn reschedule_refuses_a_confirmed_slot() {
    let app = spawn_app().await;
    let salon = seed_salon(&app).await;
    let taken = future_time(24);

    let confirmed = app
        .post(
            "/bookings/create",
            Some(&salon.client_token),
            &booking_body(&salon, &taken),
        )
        .await;
    let confirmed: serde_json::Value = confirmed.json().await.unwrap();
    let confirmed_id = confirmed["id"].as_i64().unwrap();
    app.post(
        &format!("/bookings/accept/{confirmed_id}"),
        Some(&salon.stylist_token),
        &serde_json::json!({}),
    )
    .await;

    let other_client = app.signup_client("robin").await;
    let pending = app
        .post(
            "/bookings/create",
            Some(&other_client),
            &booking_body(&salon, &future_time(30)),
        )
        .await;
    let pending: serde_json::Value = pending.json().await.unwrap();
    let pending_id = pending["id"].as_i64().unwrap();

    let response = app
        .put(
            "/bookings/update",
            Some(&other_client),
            &serde_json::json!({ "booking_id": pending_id, "appointment_time": taken }),
        )
        .await;
    assert_eq!(409, response.status().as_u16());
}

#[tokio::test]
async fn booking_on_behalf_is_for_stylists_and_admins() {
    let app = spawn_app().await;
    let salon = seed_salon(&app).await;
    let target_id = app.user_id("casey").await;

    let body = serde_json::json!({
        "user_id": target_id,
        "stylist_id": salon.stylist_id,
        "service_id": salon.service_id,
        "appointment_time": future_time(24),
    });

    let as_client = app
        .post("/bookings/create/for/targeted_user", Some(&salon.client_token), &body)
        .await;
    assert_eq!(403, as_client.status().as_u16());

    let as_stylist = app
        .post("/bookings/create/for/targeted_user", Some(&salon.stylist_token), &body)
        .await;
    assert_eq!(201, as_stylist.status().as_u16());
    let created: serde_json::Value = as_stylist.json().await.unwrap();
    assert_eq!(target_id, created["user_id"].as_i64().unwrap());

    let unknown_target = app
        .post(
            "/bookings/create/for/targeted_user",
            Some(&salon.admin_token),
            &serde_json::json!({
                "user_id": 9999,
                "stylist_id": salon.stylist_id,
                "service_id": salon.service_id,
                "appointment_time": future_time(26),
            }),
        )
        .await;
    assert_eq!(404, unknown_target.status().as_u16());
}

#[tokio::test]
async fn deleting_someone_elses_booking_is_forbidden() {
    let app = spawn_app().await;
    let salon = seed_salon(&app).await;

    let booking = app
        .post(
            "/bookings/create",
            Some(&salon.client_token),
            &booking_body(&salon, &future_time(24)),
        )
        .await;
    let booking: serde_json::Value = booking.json().await.unwrap();
    let booking_id = booking["id"].as_i64().unwrap();

    let other_client = app.signup_client("robin").await;
    let response = app
        .delete(
            &format!("/bookings/delete/{booking_id}"),
            Some(&other_client),
        )
        .await;
    assert_eq!(403, response.status().as_u16());
    assert_eq!(1, app.booking_count().await);
}

#[tokio::test]
async fn listing_partitions_on_the_current_instant_per_principal() {
    let app = spawn_app().await;
    let salon = seed_salon(&app).await;
    let casey = app.user_id("casey").await;

    // Two historical rows seeded straight into the store; the API refuses
    // past appointment times by design.
    for (hours_ago, status) in [(2i64, "completed"), (50i64, "rejected")] {
        sqlx::query(
            r#"INSERT INTO bookings (user_id, stylist_id, service_id, appointment_time, status)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(casey)
        .bind(salon.stylist_id)
        .bind(salon.service_id)
        .bind(Utc::now() - Duration::hours(hours_ago))
        .bind(status)
        .execute(&app.pool)
        .await
        .unwrap();
    }

    for hours_ahead in [48i64, 24i64] {
        let response = app
            .post(
                "/bookings/create",
                Some(&salon.client_token),
                &booking_body(&salon, &future_time(hours_ahead)),
            )
            .await;
        assert_eq!(201, response.status().as_u16());
    }

    let response = app.get("/bookings/", Some(&salon.client_token)).await;
    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();

    let previous = body["previous_bookings"].as_array().unwrap();
    let upcoming = body["upcoming_bookings"].as_array().unwrap();
    assert_eq!(2, previous.len());
    assert_eq!(2, upcoming.len());

    // Most recent past first, soonest upcoming first.
    assert_eq!("completed", previous[0]["status"]);
    assert_eq!("rejected", previous[1]["status"]);
    let first_upcoming = upcoming[0]["appointment_time"].as_str().unwrap();
    let second_upcoming = upcoming[1]["appointment_time"].as_str().unwrap();
    assert!(first_upcoming < second_upcoming);
    assert_eq!("selena", upcoming[0]["stylist_name"]);
    assert_eq!("Haircut", upcoming[0]["service_name"]);

    // Another client sees none of it.
    let other_client = app.signup_client("robin").await;
    let response = app.get("/bookings/", Some(&other_client)).await;
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["previous_bookings"].as_array().unwrap().is_empty());
    assert!(body["upcoming_bookings"].as_array().unwrap().is_empty());

    // The assigned stylist and the admin both see the full calendar.
    let response = app.get("/bookings/", Some(&salon.stylist_token)).await;
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(2, body["upcoming_bookings"].as_array().unwrap().len());

    let response = app.get("/bookings/", Some(&salon.admin_token)).await;
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(2, body["previous_bookings"].as_array().unwrap().len());
    assert_eq!(2, body["upcoming_bookings"].as_array().unwrap().len());
}
