pub mod enrollment;
pub mod model;
pub mod normalize;
pub mod store;

pub use enrollment::{EnrollmentError, NewRegistration};
pub use model::{
    Attendee, Bazar, Booth, BoothSize, Conference, Event, EventKind, Professor, Rating,
    Registration, Trip, UnknownKind, UserComment, Workshop,
};
pub use normalize::{normalize, EventView};
pub use store::EventStore;
