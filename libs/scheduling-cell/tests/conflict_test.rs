use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use scheduling_cell::models::{AppointmentCandidate, BlockedResource};
use scheduling_cell::services::ConflictDetectionService;
use scheduling_cell::store::{InMemoryIntervalStore, IntervalStore};

fn slot(hours_from_now: i64, duration_minutes: i64) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = Utc::now() + Duration::hours(hours_from_now);
    (start, start + Duration::minutes(duration_minutes))
}

fn candidate(
    doctor_id: Uuid,
    room_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> AppointmentCandidate {
    AppointmentCandidate {
        title: "Consultation".to_string(),
        doctor_id,
        room_id,
        patient_id: Uuid::new_v4(),
        start_time: start,
        end_time: end,
        color: "#3b82f6".to_string(),
    }
}

async fn seeded_checker(
    doctor_id: Uuid,
    room_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> (Arc<InMemoryIntervalStore>, ConflictDetectionService, Uuid) {
    let store = Arc::new(InMemoryIntervalStore::new());
    let existing = store
        .insert(candidate(doctor_id, room_id, start, end))
        .await
        .unwrap();
    let checker = ConflictDetectionService::new(store.clone());
    (store, checker, existing.id)
}

#[tokio::test]
async fn overlapping_booking_same_doctor_and_room_conflicts_on_both() {
    let doctor = Uuid::new_v4();
    let room = Uuid::new_v4();
    let (start, end) = slot(24, 60);
    let (_store, checker, existing_id) = seeded_checker(doctor, room, start, end).await;

    // [09:30, 10:30) against an existing [09:00, 10:00)
    let conflict = checker
        .check_conflicts(
            doctor,
            room,
            start + Duration::minutes(30),
            end + Duration::minutes(30),
            None,
        )
        .await
        .unwrap()
        .expect("overlap must be reported");

    assert_eq!(
        conflict.resource,
        BlockedResource::DoctorAndRoom {
            doctor_id: doctor,
            room_id: room
        }
    );
    assert_eq!(conflict.appointment_id, existing_id);
    assert_eq!(conflict.start_time, start);
    assert_eq!(conflict.end_time, end);
}

#[tokio::test]
async fn same_doctor_in_different_room_still_conflicts() {
    let doctor = Uuid::new_v4();
    let (start, end) = slot(24, 60);
    let (_store, checker, _) = seeded_checker(doctor, Uuid::new_v4(), start, end).await;

    let conflict = checker
        .check_conflicts(
            doctor,
            Uuid::new_v4(),
            start + Duration::minutes(30),
            end,
            None,
        )
        .await
        .unwrap()
        .expect("doctor dimension alone must block");

    assert_eq!(conflict.resource, BlockedResource::Doctor { doctor_id: doctor });
}

#[tokio::test]
async fn same_room_for_different_doctor_still_conflicts() {
    let room = Uuid::new_v4();
    let (start, end) = slot(24, 60);
    let (_store, checker, _) = seeded_checker(Uuid::new_v4(), room, start, end).await;

    let conflict = checker
        .check_conflicts(
            Uuid::new_v4(),
            room,
            start + Duration::minutes(15),
            end - Duration::minutes(15),
            None,
        )
        .await
        .unwrap()
        .expect("room dimension alone must block");

    assert_eq!(conflict.resource, BlockedResource::Room { room_id: room });
}

#[tokio::test]
async fn different_doctor_and_room_never_conflict() {
    let (start, end) = slot(24, 60);
    let (_store, checker, _) = seeded_checker(Uuid::new_v4(), Uuid::new_v4(), start, end).await;

    // Identical time range, disjoint resources.
    let conflict = checker
        .check_conflicts(Uuid::new_v4(), Uuid::new_v4(), start, end, None)
        .await
        .unwrap();

    assert!(conflict.is_none());
}

#[tokio::test]
async fn back_to_back_appointments_do_not_conflict() {
    let doctor = Uuid::new_v4();
    let room = Uuid::new_v4();
    let (start, end) = slot(24, 60);
    let (_store, checker, _) = seeded_checker(doctor, room, start, end).await;

    // Starts exactly when the existing one ends: half-open intervals touch
    // but do not overlap.
    let after = checker
        .check_conflicts(doctor, room, end, end + Duration::hours(1), None)
        .await
        .unwrap();
    assert!(after.is_none());

    // Ends exactly when the existing one starts.
    let before = checker
        .check_conflicts(doctor, room, start - Duration::hours(1), start, None)
        .await
        .unwrap();
    assert!(before.is_none());
}

#[tokio::test]
async fn overlap_check_is_symmetric() {
    let doctor = Uuid::new_v4();
    let room_a = Uuid::new_v4();
    let room_b = Uuid::new_v4();
    let (a_start, a_end) = slot(24, 90);
    let b_start = a_start + Duration::minutes(45);
    let b_end = b_start + Duration::minutes(90);

    // A seeded, B checked.
    let (_s1, checker_ab, _) = seeded_checker(doctor, room_a, a_start, a_end).await;
    let ab = checker_ab
        .check_conflicts(doctor, room_b, b_start, b_end, None)
        .await
        .unwrap();

    // B seeded, A checked.
    let (_s2, checker_ba, _) = seeded_checker(doctor, room_b, b_start, b_end).await;
    let ba = checker_ba
        .check_conflicts(doctor, room_a, a_start, a_end, None)
        .await
        .unwrap();

    assert_eq!(ab.is_some(), ba.is_some());
    assert!(ab.is_some());
}

#[tokio::test]
async fn exclusion_skips_the_appointments_own_row() {
    let doctor = Uuid::new_v4();
    let room = Uuid::new_v4();
    let (start, end) = slot(24, 60);
    let (_store, checker, existing_id) = seeded_checker(doctor, room, start, end).await;

    // Shifting an appointment into its own current range must not self-conflict.
    let conflict = checker
        .check_conflicts(
            doctor,
            room,
            start + Duration::minutes(15),
            end + Duration::minutes(15),
            Some(existing_id),
        )
        .await
        .unwrap();

    assert!(conflict.is_none());
}

#[tokio::test]
async fn degenerate_intervals_are_vacuously_clear() {
    let doctor = Uuid::new_v4();
    let room = Uuid::new_v4();
    let (start, end) = slot(24, 60);
    let (_store, checker, _) = seeded_checker(doctor, room, start, end).await;

    let mid = start + Duration::minutes(30);

    // Zero-length interval inside an existing booking.
    let zero = checker
        .check_conflicts(doctor, room, mid, mid, None)
        .await
        .unwrap();
    assert!(zero.is_none());

    // Inverted interval.
    let inverted = checker
        .check_conflicts(doctor, room, end, start, None)
        .await
        .unwrap();
    assert!(inverted.is_none());
}

#[tokio::test]
async fn earliest_starting_conflict_is_reported() {
    let doctor = Uuid::new_v4();
    let room = Uuid::new_v4();
    let store = Arc::new(InMemoryIntervalStore::new());
    let (start, _) = slot(24, 60);

    let later = store
        .insert(candidate(
            doctor,
            room,
            start + Duration::hours(2),
            start + Duration::hours(3),
        ))
        .await
        .unwrap();
    let earlier = store
        .insert(candidate(doctor, room, start, start + Duration::hours(1)))
        .await
        .unwrap();
    assert_ne!(later.id, earlier.id);

    let checker = ConflictDetectionService::new(store);
    let conflict = checker
        .check_conflicts(doctor, room, start, start + Duration::hours(4), None)
        .await
        .unwrap()
        .expect("candidate spans both bookings");

    assert_eq!(conflict.appointment_id, earlier.id);
}
