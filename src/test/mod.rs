mod channel;
mod controller;
mod endpoints;
