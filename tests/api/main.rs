mod chat;
mod health_check;
mod helpers;
mod search;
mod suggestions;
