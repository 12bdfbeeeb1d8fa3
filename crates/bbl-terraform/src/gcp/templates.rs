//! GCP terraform templates

pub const BASE: &str = r#"variable "env_id" {
  type = string
}

variable "project_id" {
  type = string
}

variable "region" {
  type = string
}

variable "zone" {
  type = string
}

variable "availability_zones" {
  type = list(string)
}

variable "credentials" {
  type = string
}

variable "subnet_cidr" {
  default = "10.0.0.0/16"
}

variable "bosh_inbound_cidr" {
  default = "0.0.0.0/0"
}

provider "google" {
  credentials = file(var.credentials)
  project     = var.project_id
  region      = var.region
}

resource "google_compute_network" "bbl_network" {
  name                    = "${var.env_id}-network"
  auto_create_subnetworks = false
}

resource "google_compute_subnetwork" "bbl_subnet" {
  name          = "${var.env_id}-subnet"
  ip_cidr_range = var.subnet_cidr
  network       = google_compute_network.bbl_network.self_link
}

resource "google_compute_router" "router" {
  name    = "${var.env_id}-router"
  network = google_compute_network.bbl_network.self_link
}

resource "google_compute_router_nat" "nat" {
  name                               = "${var.env_id}-nat"
  router                             = google_compute_router.router.name
  nat_ip_allocate_option             = "AUTO_ONLY"
  source_subnetwork_ip_ranges_to_nat = "ALL_SUBNETWORKS_ALL_IP_RANGES"
}

resource "google_compute_address" "jumpbox_ip" {
  name = "${var.env_id}-jumpbox-ip"
}

resource "google_compute_firewall" "external" {
  name    = "${var.env_id}-external"
  network = google_compute_network.bbl_network.name

  source_ranges = [var.bosh_inbound_cidr]

  allow {
    protocol = "icmp"
  }

  allow {
    protocol = "tcp"
    ports    = ["22", "6868"]
  }

  target_tags = ["${var.env_id}-jumpbox"]
}

resource "google_compute_firewall" "bosh_director" {
  name    = "${var.env_id}-bosh-director"
  network = google_compute_network.bbl_network.name

  source_tags = ["${var.env_id}-jumpbox"]

  allow {
    protocol = "tcp"
    ports    = ["22", "6868", "8443", "8844", "25555"]
  }

  target_tags = ["${var.env_id}-bosh-director"]
}

resource "google_compute_firewall" "internal" {
  name    = "${var.env_id}-internal"
  network = google_compute_network.bbl_network.name

  allow {
    protocol = "icmp"
  }

  allow {
    protocol = "tcp"
  }

  allow {
    protocol = "udp"
  }

  source_tags = [
    "${var.env_id}-bosh-director",
    "${var.env_id}-internal",
    "${var.env_id}-jumpbox",
  ]
  target_tags = ["${var.env_id}-internal", "${var.env_id}-bosh-director"]
}

output "network_name" {
  value = google_compute_network.bbl_network.name
}

output "subnetwork_name" {
  value = google_compute_subnetwork.bbl_subnet.name
}

output "internal_tag_name" {
  value = "${var.env_id}-internal"
}

output "bosh_director_tag_name" {
  value = "${var.env_id}-bosh-director"
}

output "jumpbox_tag_name" {
  value = "${var.env_id}-jumpbox"
}

output "external_ip" {
  value = google_compute_address.jumpbox_ip.address
}

output "jumpbox_url" {
  value = "${google_compute_address.jumpbox_ip.address}:22"
}

output "internal_cidr" {
  value = cidrsubnet(var.subnet_cidr, 8, 0)
}

output "internal_gw" {
  value = cidrhost(var.subnet_cidr, 1)
}

output "internal_ip" {
  value = cidrhost(var.subnet_cidr, 6)
}

output "jumpbox_internal_ip" {
  value = cidrhost(var.subnet_cidr, 5)
}

output "director_address" {
  value = "https://${cidrhost(var.subnet_cidr, 6)}:25555"
}
"#;

pub const CF_LB: &str = r#"variable "ssl_certificate" {
  type = string
}

variable "ssl_certificate_private_key" {
  type = string
}

resource "google_compute_ssl_certificate" "cf_cert" {
  name_prefix = "${var.env_id}-cert-"
  certificate = file(var.ssl_certificate)
  private_key = file(var.ssl_certificate_private_key)

  lifecycle {
    create_before_destroy = true
  }
}

resource "google_compute_instance_group" "router_lb" {
  count = length(var.availability_zones)
  name  = "${var.env_id}-router-lb-${element(var.availability_zones, count.index)}"
  zone  = element(var.availability_zones, count.index)

  named_port {
    name = "https"
    port = "443"
  }
}

resource "google_compute_health_check" "cf_public_health_check" {
  name = "${var.env_id}-cf-public"

  http_health_check {
    port         = 8080
    request_path = "/health"
  }
}

resource "google_compute_backend_service" "router_lb_backend_service" {
  name        = "${var.env_id}-router-lb"
  port_name   = "https"
  protocol    = "HTTPS"
  timeout_sec = 900
  enable_cdn  = false

  dynamic "backend" {
    for_each = google_compute_instance_group.router_lb.*.self_link
    content {
      group = backend.value
    }
  }

  health_checks = [google_compute_health_check.cf_public_health_check.id]
}

resource "google_compute_url_map" "cf_https_lb_url_map" {
  name            = "${var.env_id}-cf-http"
  default_service = google_compute_backend_service.router_lb_backend_service.self_link
}

resource "google_compute_target_https_proxy" "cf_https_lb_proxy" {
  name             = "${var.env_id}-https-proxy"
  url_map          = google_compute_url_map.cf_https_lb_url_map.self_link
  ssl_certificates = [google_compute_ssl_certificate.cf_cert.self_link]
}

resource "google_compute_global_address" "cf_address" {
  name = "${var.env_id}-cf"
}

resource "google_compute_global_forwarding_rule" "cf_https_forwarding_rule" {
  name       = "${var.env_id}-cf-https"
  ip_address = google_compute_global_address.cf_address.address
  target     = google_compute_target_https_proxy.cf_https_lb_proxy.self_link
  port_range = "443"
}

resource "google_compute_firewall" "cf_health_check" {
  name    = "${var.env_id}-cf-health-check"
  network = google_compute_network.bbl_network.name

  allow {
    protocol = "tcp"
    ports    = ["8080", "80"]
  }

  source_ranges = ["130.211.0.0/22", "35.191.0.0/16"]
  target_tags   = ["${var.env_id}-router-lb"]
}

resource "google_compute_address" "cf_ssh_proxy" {
  name = "${var.env_id}-cf-ssh-proxy"
}

resource "google_compute_target_pool" "cf_ssh_proxy" {
  name = "${var.env_id}-cf-ssh-proxy"
}

resource "google_compute_forwarding_rule" "cf_ssh_proxy" {
  name        = "${var.env_id}-cf-ssh-proxy"
  target      = google_compute_target_pool.cf_ssh_proxy.self_link
  port_range  = "2222"
  ip_protocol = "TCP"
  ip_address  = google_compute_address.cf_ssh_proxy.address
}

resource "google_compute_firewall" "cf_ssh_proxy" {
  name    = "${var.env_id}-cf-ssh-proxy-open"
  network = google_compute_network.bbl_network.name

  allow {
    protocol = "tcp"
    ports    = ["2222"]
  }

  target_tags = ["${var.env_id}-ssh-proxy"]
}

resource "google_compute_address" "cf_tcp_router" {
  name = "${var.env_id}-cf-tcp-router"
}

resource "google_compute_http_health_check" "cf_tcp_router" {
  name         = "${var.env_id}-tcp-router"
  port         = 80
  request_path = "/health"
}

resource "google_compute_target_pool" "cf_tcp_router" {
  name          = "${var.env_id}-cf-tcp-router"
  health_checks = [google_compute_http_health_check.cf_tcp_router.name]
}

resource "google_compute_forwarding_rule" "cf_tcp_router" {
  name        = "${var.env_id}-cf-tcp-router"
  target      = google_compute_target_pool.cf_tcp_router.self_link
  port_range  = "1024-32768"
  ip_protocol = "TCP"
  ip_address  = google_compute_address.cf_tcp_router.address
}

resource "google_compute_firewall" "cf_tcp_router" {
  name    = "${var.env_id}-cf-tcp-router"
  network = google_compute_network.bbl_network.name

  allow {
    protocol = "tcp"
    ports    = ["1024-32768"]
  }

  target_tags = ["${var.env_id}-cf-tcp-router"]
}

resource "google_compute_address" "cf_ws" {
  name = "${var.env_id}-cf-ws"
}

resource "google_compute_target_pool" "cf_ws" {
  name          = "${var.env_id}-cf-ws"
  health_checks = [google_compute_http_health_check.cf_tcp_router.name]
}

resource "google_compute_forwarding_rule" "cf_ws_https" {
  name        = "${var.env_id}-cf-ws-https"
  target      = google_compute_target_pool.cf_ws.self_link
  port_range  = "443"
  ip_protocol = "TCP"
  ip_address  = google_compute_address.cf_ws.address
}

resource "google_compute_address" "credhub" {
  name = "${var.env_id}-credhub"
}

resource "google_compute_target_pool" "credhub" {
  name = "${var.env_id}-credhub"
}

resource "google_compute_forwarding_rule" "credhub" {
  name        = "${var.env_id}-credhub"
  target      = google_compute_target_pool.credhub.self_link
  port_range  = "8844"
  ip_protocol = "TCP"
  ip_address  = google_compute_address.credhub.address
}

resource "google_compute_firewall" "credhub" {
  name    = "${var.env_id}-credhub-open"
  network = google_compute_network.bbl_network.name

  allow {
    protocol = "tcp"
    ports    = ["8844"]
  }

  target_tags = ["${var.env_id}-credhub"]
}

output "router_backend_service" {
  value = google_compute_backend_service.router_lb_backend_service.name
}

output "router_lb_ip" {
  value = google_compute_global_address.cf_address.address
}

output "ssh_proxy_target_pool" {
  value = google_compute_target_pool.cf_ssh_proxy.name
}

output "ssh_proxy_lb_ip" {
  value = google_compute_address.cf_ssh_proxy.address
}

output "tcp_router_target_pool" {
  value = google_compute_target_pool.cf_tcp_router.name
}

output "tcp_router_lb_ip" {
  value = google_compute_address.cf_tcp_router.address
}

output "ws_target_pool" {
  value = google_compute_target_pool.cf_ws.name
}

output "ws_lb_ip" {
  value = google_compute_address.cf_ws.address
}

output "credhub_target_pool" {
  value = google_compute_target_pool.credhub.name
}

output "credhub_lb_ip" {
  value = google_compute_address.credhub.address
}
"#;

pub const CF_DNS: &str = r#"variable "system_domain" {
  type = string
}

resource "google_dns_managed_zone" "env_dns_zone" {
  name        = "${var.env_id}-zone"
  dns_name    = "${var.system_domain}."
  description = "DNS zone for the ${var.env_id} environment"
}

resource "google_dns_record_set" "wildcard_dns" {
  name         = "*.${google_dns_managed_zone.env_dns_zone.dns_name}"
  type         = "A"
  ttl          = 300
  managed_zone = google_dns_managed_zone.env_dns_zone.name
  rrdatas      = [google_compute_global_address.cf_address.address]
}

resource "google_dns_record_set" "doppler_dns" {
  name         = "doppler.${google_dns_managed_zone.env_dns_zone.dns_name}"
  type         = "A"
  ttl          = 300
  managed_zone = google_dns_managed_zone.env_dns_zone.name
  rrdatas      = [google_compute_address.cf_ws.address]
}

resource "google_dns_record_set" "ssh_proxy_dns" {
  name         = "ssh.${google_dns_managed_zone.env_dns_zone.dns_name}"
  type         = "A"
  ttl          = 300
  managed_zone = google_dns_managed_zone.env_dns_zone.name
  rrdatas      = [google_compute_address.cf_ssh_proxy.address]
}

resource "google_dns_record_set" "tcp_dns" {
  name         = "tcp.${google_dns_managed_zone.env_dns_zone.dns_name}"
  type         = "A"
  ttl          = 300
  managed_zone = google_dns_managed_zone.env_dns_zone.name
  rrdatas      = [google_compute_address.cf_tcp_router.address]
}

output "system_domain_dns_servers" {
  value = google_dns_managed_zone.env_dns_zone.name_servers
}
"#;

pub const CONCOURSE_LB: &str = r#"resource "google_compute_address" "concourse_address" {
  name = "${var.env_id}-concourse"
}

resource "google_compute_http_health_check" "concourse" {
  name         = "${var.env_id}-concourse"
  port         = 8080
  request_path = "/"
}

resource "google_compute_target_pool" "concourse_target_pool" {
  name          = "${var.env_id}-concourse"
  health_checks = [google_compute_http_health_check.concourse.name]
}

resource "google_compute_forwarding_rule" "concourse_http" {
  name        = "${var.env_id}-concourse-http"
  target      = google_compute_target_pool.concourse_target_pool.self_link
  port_range  = "80"
  ip_protocol = "TCP"
  ip_address  = google_compute_address.concourse_address.address
}

resource "google_compute_forwarding_rule" "concourse_https" {
  name        = "${var.env_id}-concourse-https"
  target      = google_compute_target_pool.concourse_target_pool.self_link
  port_range  = "443"
  ip_protocol = "TCP"
  ip_address  = google_compute_address.concourse_address.address
}

resource "google_compute_forwarding_rule" "concourse_ssh" {
  name        = "${var.env_id}-concourse-ssh"
  target      = google_compute_target_pool.concourse_target_pool.self_link
  port_range  = "2222"
  ip_protocol = "TCP"
  ip_address  = google_compute_address.concourse_address.address
}

resource "google_compute_firewall" "concourse" {
  name    = "${var.env_id}-concourse-open"
  network = google_compute_network.bbl_network.name

  allow {
    protocol = "tcp"
    ports    = ["443", "2222", "8080"]
  }

  target_tags = ["${var.env_id}-concourse"]
}

output "concourse_target_pool" {
  value = google_compute_target_pool.concourse_target_pool.name
}

output "concourse_lb_ip" {
  value = google_compute_address.concourse_address.address
}
"#;
