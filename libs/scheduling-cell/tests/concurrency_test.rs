use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;
use uuid::Uuid;

use directory_cell::models::{CreateDoctorRequest, CreateRoomRequest};
use directory_cell::services::DirectoryService;
use scheduling_cell::models::{AppointmentSearchQuery, BookAppointmentRequest, SchedulingError};
use scheduling_cell::store::InMemoryIntervalStore;
use scheduling_cell::SchedulingState;
use shared_config::AppConfig;

async fn clinic() -> (Arc<SchedulingState>, Arc<DirectoryService>) {
    let directory = Arc::new(DirectoryService::new());
    let store = Arc::new(InMemoryIntervalStore::new());
    let state = Arc::new(SchedulingState::new(
        AppConfig::default(),
        store,
        directory.clone(),
    ));
    (state, directory)
}

async fn add_doctor(directory: &DirectoryService, last_name: &str) -> Uuid {
    directory
        .register_doctor(CreateDoctorRequest {
            first_name: "Test".to_string(),
            last_name: last_name.to_string(),
            specialty: "General".to_string(),
        })
        .await
        .unwrap()
        .id
}

async fn add_room(directory: &DirectoryService, name: &str) -> Uuid {
    directory
        .register_room(CreateRoomRequest {
            name: name.to_string(),
            location: "Ground floor".to_string(),
        })
        .await
        .unwrap()
        .id
}

fn request(
    doctor_id: Uuid,
    room_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> BookAppointmentRequest {
    BookAppointmentRequest {
        title: "Consultation".to_string(),
        doctor_id,
        room_id,
        patient_id: Uuid::new_v4(),
        start_time: start,
        end_time: end,
        color: None,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn identical_slot_race_has_exactly_one_winner() {
    let (state, directory) = clinic().await;
    let doctor = add_doctor(&directory, "Martinez").await;
    let room = add_room(&directory, "Room 101").await;

    let start = Utc::now() + Duration::hours(24);
    let end = start + Duration::hours(1);

    let attempts = 16;
    let tasks: Vec<_> = (0..attempts)
        .map(|_| {
            let state = Arc::clone(&state);
            tokio::spawn(async move {
                state
                    .booking_service()
                    .book_appointment(request(doctor, room, start, end))
                    .await
            })
        })
        .collect();

    let results = join_all(tasks).await;

    let mut committed = 0;
    let mut rejected = 0;
    for result in results {
        match result.unwrap() {
            Ok(_) => committed += 1,
            Err(SchedulingError::Conflict(conflict)) => {
                // Losers are told which resources block them.
                assert_eq!(
                    conflict.resource,
                    scheduling_cell::models::BlockedResource::DoctorAndRoom {
                        doctor_id: doctor,
                        room_id: room
                    }
                );
                rejected += 1;
            }
            Err(other) => panic!("unexpected failure mode: {:?}", other),
        }
    }

    assert_eq!(committed, 1);
    assert_eq!(rejected, attempts - 1);

    let rows = state
        .booking_service()
        .search_appointments(AppointmentSearchQuery::default())
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn same_doctor_across_rooms_still_admits_only_one_overlapping_booking() {
    let (state, directory) = clinic().await;
    let doctor = add_doctor(&directory, "Martinez").await;

    let start = Utc::now() + Duration::hours(24);

    // Every attempt uses a distinct room, so only the doctor dimension is
    // contended; mutually overlapping staggered intervals.
    let mut rooms = Vec::new();
    for i in 0..8 {
        rooms.push(add_room(&directory, &format!("Room {}", 100 + i)).await);
    }

    let tasks: Vec<_> = rooms
        .into_iter()
        .enumerate()
        .map(|(i, room)| {
            let state = Arc::clone(&state);
            let slot_start = start + Duration::minutes(i as i64 * 5);
            let slot_end = slot_start + Duration::hours(1);
            tokio::spawn(async move {
                state
                    .booking_service()
                    .book_appointment(request(doctor, room, slot_start, slot_end))
                    .await
            })
        })
        .collect();

    let results = join_all(tasks).await;
    let committed = results
        .iter()
        .filter(|r| matches!(r.as_ref().unwrap(), Ok(_)))
        .count();

    assert_eq!(committed, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn disjoint_resources_do_not_contend() {
    let (state, directory) = clinic().await;

    let start = Utc::now() + Duration::hours(24);
    let end = start + Duration::hours(1);

    let mut pairs = Vec::new();
    for i in 0..8 {
        let doctor = add_doctor(&directory, &format!("Doctor{}", i)).await;
        let room = add_room(&directory, &format!("Room {}", 200 + i)).await;
        pairs.push((doctor, room));
    }

    // Identical time range everywhere, but no shared doctor or room: every
    // booking must commit.
    let tasks: Vec<_> = pairs
        .into_iter()
        .map(|(doctor, room)| {
            let state = Arc::clone(&state);
            tokio::spawn(async move {
                state
                    .booking_service()
                    .book_appointment(request(doctor, room, start, end))
                    .await
            })
        })
        .collect();

    let results = join_all(tasks).await;
    for result in results {
        assert!(result.unwrap().is_ok());
    }

    let rows = state
        .booking_service()
        .search_appointments(AppointmentSearchQuery::default())
        .await
        .unwrap();
    assert_eq!(rows.len(), 8);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_reschedules_of_adjacent_slots_preserve_the_invariant() {
    let (state, directory) = clinic().await;
    let doctor = add_doctor(&directory, "Martinez").await;
    let room = add_room(&directory, "Room 101").await;

    let start = Utc::now() + Duration::hours(24);
    let service = state.booking_service();

    // Two back-to-back bookings.
    let first = service
        .book_appointment(request(doctor, room, start, start + Duration::hours(1)))
        .await
        .unwrap();
    let second = service
        .book_appointment(request(
            doctor,
            room,
            start + Duration::hours(1),
            start + Duration::hours(2),
        ))
        .await
        .unwrap();

    // Both race to move into the same free evening slot; whichever commits
    // first claims it and the other must observe the conflict.
    let state_a = Arc::clone(&state);
    let state_b = Arc::clone(&state);
    let target_a = request(
        doctor,
        room,
        start + Duration::hours(3),
        start + Duration::hours(4),
    );
    let target_b = request(
        doctor,
        room,
        start + Duration::hours(3),
        start + Duration::hours(4),
    );

    let (ra, rb) = tokio::join!(
        tokio::spawn(async move {
            state_a
                .booking_service()
                .reschedule_appointment(first.id, target_a)
                .await
        }),
        tokio::spawn(async move {
            state_b
                .booking_service()
                .reschedule_appointment(second.id, target_b)
                .await
        }),
    );

    let outcomes = [ra.unwrap(), rb.unwrap()];
    let wins = outcomes.iter().filter(|r| r.is_ok()).count();
    assert_eq!(wins, 1, "exactly one reschedule may commit: {:?}", outcomes);

    // Final state still satisfies the no-overlap invariant.
    let rows = state
        .booking_service()
        .search_appointments(AppointmentSearchQuery::default())
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    for a in &rows {
        for b in &rows {
            if a.id != b.id {
                assert!(
                    !a.overlaps(b.start_time, b.end_time),
                    "overlap between {:?} and {:?}",
                    a,
                    b
                );
            }
        }
    }
}
