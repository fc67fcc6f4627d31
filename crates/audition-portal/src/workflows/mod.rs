pub mod auditions;
