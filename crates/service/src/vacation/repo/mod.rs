pub mod seaorm;

pub use seaorm::SeaOrmVacationRepository;
