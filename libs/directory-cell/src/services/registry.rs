// libs/directory-cell/src/services/registry.rs
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{CreateDoctorRequest, CreateRoomRequest, DirectoryError, Doctor, Room};

/// Existence checks consumed by the scheduling cell when validating a booking
/// candidate's resource ids.
#[async_trait]
pub trait ResourceDirectory: Send + Sync {
    async fn doctor_exists(&self, doctor_id: Uuid) -> bool;
    async fn room_exists(&self, room_id: Uuid) -> bool;
}

/// In-memory registry of the clinic's doctors and consultation rooms.
#[derive(Default)]
pub struct DirectoryService {
    doctors: RwLock<HashMap<Uuid, Doctor>>,
    rooms: RwLock<HashMap<Uuid, Room>>,
}

impl DirectoryService {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register_doctor(
        &self,
        request: CreateDoctorRequest,
    ) -> Result<Doctor, DirectoryError> {
        if request.first_name.trim().is_empty() || request.last_name.trim().is_empty() {
            return Err(DirectoryError::Validation(
                "Doctor name is required".to_string(),
            ));
        }

        let doctor = Doctor {
            id: Uuid::new_v4(),
            first_name: request.first_name,
            last_name: request.last_name,
            specialty: request.specialty,
            created_at: Utc::now(),
        };

        let mut doctors = self.doctors.write().await;
        doctors.insert(doctor.id, doctor.clone());
        info!("Registered doctor {} ({})", doctor.id, doctor.full_name());
        Ok(doctor)
    }

    pub async fn register_room(&self, request: CreateRoomRequest) -> Result<Room, DirectoryError> {
        if request.name.trim().is_empty() {
            return Err(DirectoryError::Validation(
                "Room name is required".to_string(),
            ));
        }

        let room = Room {
            id: Uuid::new_v4(),
            name: request.name,
            location: request.location,
            created_at: Utc::now(),
        };

        let mut rooms = self.rooms.write().await;
        rooms.insert(room.id, room.clone());
        info!("Registered room {} ({})", room.id, room.name);
        Ok(room)
    }

    pub async fn get_doctor(&self, doctor_id: Uuid) -> Result<Doctor, DirectoryError> {
        let doctors = self.doctors.read().await;
        doctors
            .get(&doctor_id)
            .cloned()
            .ok_or(DirectoryError::DoctorNotFound)
    }

    pub async fn get_room(&self, room_id: Uuid) -> Result<Room, DirectoryError> {
        let rooms = self.rooms.read().await;
        rooms.get(&room_id).cloned().ok_or(DirectoryError::RoomNotFound)
    }

    pub async fn list_doctors(&self) -> Vec<Doctor> {
        let doctors = self.doctors.read().await;
        let mut all: Vec<Doctor> = doctors.values().cloned().collect();
        all.sort_by(|a, b| a.last_name.cmp(&b.last_name));
        all
    }

    pub async fn list_rooms(&self) -> Vec<Room> {
        let rooms = self.rooms.read().await;
        let mut all: Vec<Room> = rooms.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    pub async fn remove_doctor(&self, doctor_id: Uuid) -> Result<(), DirectoryError> {
        let mut doctors = self.doctors.write().await;
        match doctors.remove(&doctor_id) {
            Some(_) => {
                debug!("Removed doctor {}", doctor_id);
                Ok(())
            }
            None => Err(DirectoryError::DoctorNotFound),
        }
    }

    pub async fn remove_room(&self, room_id: Uuid) -> Result<(), DirectoryError> {
        let mut rooms = self.rooms.write().await;
        match rooms.remove(&room_id) {
            Some(_) => {
                debug!("Removed room {}", room_id);
                Ok(())
            }
            None => Err(DirectoryError::RoomNotFound),
        }
    }
}

#[async_trait]
impl ResourceDirectory for DirectoryService {
    async fn doctor_exists(&self, doctor_id: Uuid) -> bool {
        let doctors = self.doctors.read().await;
        doctors.contains_key(&doctor_id)
    }

    async fn room_exists(&self, room_id: Uuid) -> bool {
        let rooms = self.rooms.read().await;
        rooms.contains_key(&room_id)
    }
}
