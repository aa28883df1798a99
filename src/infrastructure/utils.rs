pub mod get_client_ip;
