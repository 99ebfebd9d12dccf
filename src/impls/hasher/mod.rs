pub mod bcrypt;
