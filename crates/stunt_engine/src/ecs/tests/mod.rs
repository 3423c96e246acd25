//! Integration tests driving the entity system through whole frames

mod frame_scenarios;
