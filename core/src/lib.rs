#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Knapsack Arena.
//!
//! This crate defines the data model and message surface connecting the puzzle
//! generator, the attempt services, and the lobby. Connections submit
//! [`RoomCommand`] values, the lobby applies them to a room and answers with
//! [`Outbound`] effects for a [`RoomBus`]. Attempts and challenges are persisted
//! through the store traits, which the core only consumes.

mod attempt;
mod bus;
mod clock;
mod error;
mod ids;
mod puzzle;
mod room;
mod store;

pub use attempt::{AttemptStarted, AttemptStatus, PlaySession, ScoreAdjustment, TeamInfo};
pub use bus::RoomBus;
pub use clock::{Clock, SystemClock};
pub use error::{
    CoreError, NotFound, ParseDifficultyError, StoreError, TableShapeError, ValidationError,
};
pub use ids::{ChallengeId, ConnectionId, ItemId, RoomId, SessionId, TeamId, UserId};
pub use puzzle::{CellCoord, Challenge, Difficulty, DpTable, Item, Puzzle};
pub use room::{Delivery, Outbound, PlayerSnapshot, Relay, RoomCommand, RoomEvent};
pub use store::{ChallengeStore, IdentityStore, Page, SessionStore, User};

#[cfg(test)]
mod tests {
    use super::{CellCoord, Difficulty, DpTable, Relay, RoomEvent, TableShapeError};
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn dp_table_round_trips_through_bincode() {
        let table = DpTable::try_from(vec![vec![0u64, 0, 0], vec![0, 3, 3]]).expect("table");
        assert_round_trip(&table);
    }

    #[test]
    fn zeroed_tables_are_filled_one_row_pair_at_a_time() {
        let mut table = DpTable::zeroed(2, 3);
        assert_eq!((table.rows(), table.columns()), (3, 4));
        assert!(table.split_row_mut(0).is_none());
        assert!(table.split_row_mut(3).is_none());

        let (previous, current) = table.split_row_mut(1).expect("first item row");
        assert_eq!(previous, &[0, 0, 0, 0]);
        current.copy_from_slice(&[0, 0, 3, 3]);
        let (previous, current) = table.split_row_mut(2).expect("second item row");
        assert_eq!(previous, &[0, 0, 3, 3]);
        current[3] = 4;

        assert_eq!(table.row(1), Some(&[0, 0, 3, 3][..]));
        assert_eq!(table.final_value(), 4);
        assert_eq!(DpTable::zeroed(0, 0).final_value(), 0);
    }

    #[test]
    fn cell_coord_round_trips_through_bincode() {
        assert_round_trip(&CellCoord::new(2, 5));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let error = DpTable::try_from(vec![vec![0u64, 0], vec![0]]).expect_err("ragged");
        assert_eq!(
            error,
            TableShapeError::Ragged {
                row: 1,
                expected: 2,
                found: 1,
            }
        );
        assert_eq!(
            DpTable::try_from(Vec::<Vec<u64>>::new()).expect_err("empty"),
            TableShapeError::Empty
        );
    }

    #[test]
    fn dp_table_serialises_as_nested_rows() {
        let table = DpTable::from_row_major(2, 2, vec![0, 0, 0, 4]).expect("table");
        let json = serde_json::to_string(&table).expect("json");
        assert_eq!(json, "[[0,0],[0,4]]");
        assert_eq!(table.final_value(), 4);
        assert_eq!(table.final_cell(), CellCoord::new(1, 1));
    }

    #[test]
    fn difficulty_parses_names_and_levels() {
        assert_eq!("HARD".parse::<Difficulty>(), Ok(Difficulty::Hard));
        assert_eq!("2".parse::<Difficulty>(), Ok(Difficulty::Medium));
        assert!("4".parse::<Difficulty>().is_err());
        assert!("extreme".parse::<Difficulty>().is_err());
        assert_eq!(Difficulty::default(), Difficulty::Easy);
    }

    #[test]
    fn room_events_use_camel_case_wire_names() {
        let event = Relay::CellUpdate {
            row: 1,
            col: 2,
            value: 7,
            is_correct: true,
        }
        .into_event();
        let json = serde_json::to_value(&event).expect("json");
        assert_eq!(json["event"], "cellUpdated");
        assert_eq!(json["data"]["isCorrect"], true);

        let kicked = serde_json::to_value(RoomEvent::KickedFromRoom).expect("json");
        assert_eq!(kicked["event"], "kickedFromRoom");

        let signal = serde_json::to_value(Relay::StartSignal.into_event()).expect("json");
        assert_eq!(signal["event"], "startSignalled");
    }

    #[test]
    fn only_cell_and_score_relays_skip_the_sender() {
        assert!(Relay::ScoreDeduct {
            row: 1,
            col: 1,
            score_change: -5,
        }
        .excludes_sender());
        assert!(!Relay::RevealCell.excludes_sender());
        assert!(!Relay::StartSignal.excludes_sender());
    }
}
