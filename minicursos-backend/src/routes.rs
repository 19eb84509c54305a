pub mod index;
pub mod indexcss;
pub mod login;
pub mod logout;
pub mod not_found;
pub mod registrations;
pub mod sucesso;
