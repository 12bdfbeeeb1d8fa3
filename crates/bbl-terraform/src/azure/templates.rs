//! Azure terraform templates

pub const BASE: &str = r#"variable "env_id" {
  type = string
}

variable "simple_env_id" {
  type = string
}

variable "subscription_id" {
  type = string
}

variable "tenant_id" {
  type = string
}

variable "client_id" {
  type = string
}

variable "client_secret" {
  type = string
}

variable "region" {
  type = string
}

variable "network_cidr" {
  default = "10.0.0.0/16"
}

variable "bosh_inbound_cidr" {
  default = "*"
}

provider "azurerm" {
  features {}

  subscription_id = var.subscription_id
  tenant_id       = var.tenant_id
  client_id       = var.client_id
  client_secret   = var.client_secret
}

resource "azurerm_resource_group" "bosh" {
  name     = "${var.env_id}-bosh"
  location = var.region
}

resource "azurerm_public_ip" "bosh" {
  name                = "${var.env_id}-bosh"
  location            = var.region
  resource_group_name = azurerm_resource_group.bosh.name
  allocation_method   = "Static"
}

resource "azurerm_virtual_network" "bosh" {
  name                = "${var.env_id}-bosh-vn"
  address_space       = [var.network_cidr]
  location            = var.region
  resource_group_name = azurerm_resource_group.bosh.name
}

resource "azurerm_subnet" "bosh" {
  name                 = "${var.env_id}-bosh-sn"
  address_prefixes     = [var.network_cidr]
  resource_group_name  = azurerm_resource_group.bosh.name
  virtual_network_name = azurerm_virtual_network.bosh.name
}

resource "azurerm_storage_account" "bosh" {
  name                     = var.simple_env_id
  resource_group_name      = azurerm_resource_group.bosh.name
  location                 = var.region
  account_tier             = "Standard"
  account_replication_type = "GRS"
}

resource "azurerm_storage_container" "bosh" {
  name                  = "bosh"
  storage_account_name  = azurerm_storage_account.bosh.name
  container_access_type = "private"
}

resource "azurerm_storage_container" "stemcell" {
  name                  = "stemcell"
  storage_account_name  = azurerm_storage_account.bosh.name
  container_access_type = "blob"
}

resource "azurerm_network_security_group" "bosh" {
  name                = "${var.env_id}-bosh"
  location            = var.region
  resource_group_name = azurerm_resource_group.bosh.name
}

resource "azurerm_network_security_rule" "ssh" {
  name                        = "${var.env_id}-ssh"
  priority                    = 200
  direction                   = "Inbound"
  access                      = "Allow"
  protocol                    = "Tcp"
  source_port_range           = "*"
  destination_port_range      = "22"
  source_address_prefix       = var.bosh_inbound_cidr
  destination_address_prefix  = "*"
  resource_group_name         = azurerm_resource_group.bosh.name
  network_security_group_name = azurerm_network_security_group.bosh.name
}

resource "azurerm_network_security_rule" "bosh_agent" {
  name                        = "${var.env_id}-bosh-agent"
  priority                    = 201
  direction                   = "Inbound"
  access                      = "Allow"
  protocol                    = "Tcp"
  source_port_range           = "*"
  destination_port_range      = "6868"
  source_address_prefix       = var.bosh_inbound_cidr
  destination_address_prefix  = "*"
  resource_group_name         = azurerm_resource_group.bosh.name
  network_security_group_name = azurerm_network_security_group.bosh.name
}

resource "azurerm_network_security_rule" "bosh_director" {
  name                        = "${var.env_id}-bosh-director"
  priority                    = 202
  direction                   = "Inbound"
  access                      = "Allow"
  protocol                    = "Tcp"
  source_port_range           = "*"
  destination_port_range      = "25555"
  source_address_prefix       = var.bosh_inbound_cidr
  destination_address_prefix  = "*"
  resource_group_name         = azurerm_resource_group.bosh.name
  network_security_group_name = azurerm_network_security_group.bosh.name
}

resource "azurerm_network_security_rule" "uaa_credhub" {
  name                        = "${var.env_id}-uaa-credhub"
  priority                    = 203
  direction                   = "Inbound"
  access                      = "Allow"
  protocol                    = "Tcp"
  source_port_range           = "*"
  destination_port_range      = "8443-8844"
  source_address_prefix       = var.bosh_inbound_cidr
  destination_address_prefix  = "*"
  resource_group_name         = azurerm_resource_group.bosh.name
  network_security_group_name = azurerm_network_security_group.bosh.name
}

resource "azurerm_network_security_group" "cf" {
  name                = "${var.env_id}-cf"
  location            = var.region
  resource_group_name = azurerm_resource_group.bosh.name
}

output "vnet_name" {
  value = azurerm_virtual_network.bosh.name
}

output "subnet_name" {
  value = azurerm_subnet.bosh.name
}

output "resource_group_name" {
  value = azurerm_resource_group.bosh.name
}

output "storage_account_name" {
  value = azurerm_storage_account.bosh.name
}

output "default_security_group" {
  value = azurerm_network_security_group.bosh.name
}

output "external_ip" {
  value = azurerm_public_ip.bosh.ip_address
}

output "jumpbox_url" {
  value = "${azurerm_public_ip.bosh.ip_address}:22"
}

output "internal_cidr" {
  value = cidrsubnet(var.network_cidr, 8, 0)
}

output "internal_gw" {
  value = cidrhost(var.network_cidr, 1)
}

output "internal_ip" {
  value = cidrhost(var.network_cidr, 6)
}

output "jumpbox_internal_ip" {
  value = cidrhost(var.network_cidr, 5)
}

output "director_address" {
  value = "https://${cidrhost(var.network_cidr, 6)}:25555"
}
"#;

pub const CF_LB: &str = r#"resource "azurerm_public_ip" "cf_router" {
  name                = "${var.env_id}-cf-router-lb-ip"
  location            = var.region
  resource_group_name = azurerm_resource_group.bosh.name
  allocation_method   = "Static"
  sku                 = "Standard"
}

resource "azurerm_lb" "cf_router" {
  name                = "${var.env_id}-cf-router-lb"
  location            = var.region
  resource_group_name = azurerm_resource_group.bosh.name
  sku                 = "Standard"

  frontend_ip_configuration {
    name                 = "${var.env_id}-cf-router-frontend"
    public_ip_address_id = azurerm_public_ip.cf_router.id
  }
}

resource "azurerm_lb_backend_address_pool" "cf_router" {
  name            = "${var.env_id}-cf-router-backend-pool"
  loadbalancer_id = azurerm_lb.cf_router.id
}

resource "azurerm_lb_probe" "cf_router" {
  name            = "${var.env_id}-cf-router-probe"
  loadbalancer_id = azurerm_lb.cf_router.id
  protocol        = "Tcp"
  port            = 80
}

resource "azurerm_lb_rule" "cf_router_https" {
  name                           = "${var.env_id}-cf-router-https"
  loadbalancer_id                = azurerm_lb.cf_router.id
  protocol                       = "Tcp"
  frontend_port                  = 443
  backend_port                   = 443
  frontend_ip_configuration_name = "${var.env_id}-cf-router-frontend"
  backend_address_pool_ids       = [azurerm_lb_backend_address_pool.cf_router.id]
  probe_id                       = azurerm_lb_probe.cf_router.id
}

resource "azurerm_lb_rule" "cf_router_http" {
  name                           = "${var.env_id}-cf-router-http"
  loadbalancer_id                = azurerm_lb.cf_router.id
  protocol                       = "Tcp"
  frontend_port                  = 80
  backend_port                   = 80
  frontend_ip_configuration_name = "${var.env_id}-cf-router-frontend"
  backend_address_pool_ids       = [azurerm_lb_backend_address_pool.cf_router.id]
  probe_id                       = azurerm_lb_probe.cf_router.id
}

resource "azurerm_public_ip" "cf_ssh" {
  name                = "${var.env_id}-cf-ssh-lb-ip"
  location            = var.region
  resource_group_name = azurerm_resource_group.bosh.name
  allocation_method   = "Static"
  sku                 = "Standard"
}

resource "azurerm_lb" "cf_ssh" {
  name                = "${var.env_id}-cf-ssh-lb"
  location            = var.region
  resource_group_name = azurerm_resource_group.bosh.name
  sku                 = "Standard"

  frontend_ip_configuration {
    name                 = "${var.env_id}-cf-ssh-frontend"
    public_ip_address_id = azurerm_public_ip.cf_ssh.id
  }
}

resource "azurerm_lb_backend_address_pool" "cf_ssh" {
  name            = "${var.env_id}-cf-ssh-backend-pool"
  loadbalancer_id = azurerm_lb.cf_ssh.id
}

resource "azurerm_lb_probe" "cf_ssh" {
  name            = "${var.env_id}-cf-ssh-probe"
  loadbalancer_id = azurerm_lb.cf_ssh.id
  protocol        = "Tcp"
  port            = 2222
}

resource "azurerm_lb_rule" "cf_ssh" {
  name                           = "${var.env_id}-cf-ssh"
  loadbalancer_id                = azurerm_lb.cf_ssh.id
  protocol                       = "Tcp"
  frontend_port                  = 2222
  backend_port                   = 2222
  frontend_ip_configuration_name = "${var.env_id}-cf-ssh-frontend"
  backend_address_pool_ids       = [azurerm_lb_backend_address_pool.cf_ssh.id]
  probe_id                       = azurerm_lb_probe.cf_ssh.id
}

resource "azurerm_public_ip" "cf_tcp" {
  name                = "${var.env_id}-cf-tcp-lb-ip"
  location            = var.region
  resource_group_name = azurerm_resource_group.bosh.name
  allocation_method   = "Static"
  sku                 = "Standard"
}

resource "azurerm_lb" "cf_tcp" {
  name                = "${var.env_id}-cf-tcp-lb"
  location            = var.region
  resource_group_name = azurerm_resource_group.bosh.name
  sku                 = "Standard"

  frontend_ip_configuration {
    name                 = "${var.env_id}-cf-tcp-frontend"
    public_ip_address_id = azurerm_public_ip.cf_tcp.id
  }
}

resource "azurerm_lb_backend_address_pool" "cf_tcp" {
  name            = "${var.env_id}-cf-tcp-backend-pool"
  loadbalancer_id = azurerm_lb.cf_tcp.id
}

resource "azurerm_lb_probe" "cf_tcp" {
  name            = "${var.env_id}-cf-tcp-probe"
  loadbalancer_id = azurerm_lb.cf_tcp.id
  protocol        = "Tcp"
  port            = 80
}

resource "azurerm_lb_rule" "cf_tcp" {
  count                          = 10
  name                           = "${var.env_id}-cf-tcp-${1024 + count.index}"
  loadbalancer_id                = azurerm_lb.cf_tcp.id
  protocol                       = "Tcp"
  frontend_port                  = 1024 + count.index
  backend_port                   = 1024 + count.index
  frontend_ip_configuration_name = "${var.env_id}-cf-tcp-frontend"
  backend_address_pool_ids       = [azurerm_lb_backend_address_pool.cf_tcp.id]
  probe_id                       = azurerm_lb_probe.cf_tcp.id
}

resource "azurerm_public_ip" "credhub" {
  name                = "${var.env_id}-credhub-lb-ip"
  location            = var.region
  resource_group_name = azurerm_resource_group.bosh.name
  allocation_method   = "Static"
  sku                 = "Standard"
}

resource "azurerm_lb" "credhub" {
  name                = "${var.env_id}-credhub-lb"
  location            = var.region
  resource_group_name = azurerm_resource_group.bosh.name
  sku                 = "Standard"

  frontend_ip_configuration {
    name                 = "${var.env_id}-credhub-frontend"
    public_ip_address_id = azurerm_public_ip.credhub.id
  }
}

resource "azurerm_lb_backend_address_pool" "credhub" {
  name            = "${var.env_id}-credhub-backend-pool"
  loadbalancer_id = azurerm_lb.credhub.id
}

resource "azurerm_lb_probe" "credhub" {
  name            = "${var.env_id}-credhub-probe"
  loadbalancer_id = azurerm_lb.credhub.id
  protocol        = "Tcp"
  port            = 8844
}

resource "azurerm_lb_rule" "credhub" {
  name                           = "${var.env_id}-credhub"
  loadbalancer_id                = azurerm_lb.credhub.id
  protocol                       = "Tcp"
  frontend_port                  = 8844
  backend_port                   = 8844
  frontend_ip_configuration_name = "${var.env_id}-credhub-frontend"
  backend_address_pool_ids       = [azurerm_lb_backend_address_pool.credhub.id]
  probe_id                       = azurerm_lb_probe.credhub.id
}

output "cf_router_lb_name" {
  value = azurerm_lb.cf_router.name
}

output "cf_router_lb_ip" {
  value = azurerm_public_ip.cf_router.ip_address
}

output "cf_ssh_lb_name" {
  value = azurerm_lb.cf_ssh.name
}

output "cf_ssh_lb_ip" {
  value = azurerm_public_ip.cf_ssh.ip_address
}

output "cf_tcp_lb_name" {
  value = azurerm_lb.cf_tcp.name
}

output "cf_tcp_lb_ip" {
  value = azurerm_public_ip.cf_tcp.ip_address
}

output "credhub_lb_name" {
  value = azurerm_lb.credhub.name
}

output "credhub_lb_ip" {
  value = azurerm_public_ip.credhub.ip_address
}

output "cf_security_group" {
  value = azurerm_network_security_group.cf.name
}
"#;

pub const CF_DNS: &str = r#"variable "system_domain" {
  type = string
}

resource "azurerm_dns_zone" "cf" {
  name                = var.system_domain
  resource_group_name = azurerm_resource_group.bosh.name
}

resource "azurerm_dns_a_record" "wildcard" {
  name                = "*"
  zone_name           = azurerm_dns_zone.cf.name
  resource_group_name = azurerm_resource_group.bosh.name
  ttl                 = 300
  records             = [azurerm_public_ip.cf_router.ip_address]
}

resource "azurerm_dns_a_record" "ssh" {
  name                = "ssh"
  zone_name           = azurerm_dns_zone.cf.name
  resource_group_name = azurerm_resource_group.bosh.name
  ttl                 = 300
  records             = [azurerm_public_ip.cf_ssh.ip_address]
}

resource "azurerm_dns_a_record" "tcp" {
  name                = "tcp"
  zone_name           = azurerm_dns_zone.cf.name
  resource_group_name = azurerm_resource_group.bosh.name
  ttl                 = 300
  records             = [azurerm_public_ip.cf_tcp.ip_address]
}

output "system_domain_dns_servers" {
  value = azurerm_dns_zone.cf.name_servers
}
"#;

pub const CONCOURSE_LB: &str = r#"resource "azurerm_public_ip" "concourse" {
  name                = "${var.env_id}-concourse-lb-ip"
  location            = var.region
  resource_group_name = azurerm_resource_group.bosh.name
  allocation_method   = "Static"
  sku                 = "Standard"
}

resource "azurerm_lb" "concourse" {
  name                = "${var.env_id}-concourse-lb"
  location            = var.region
  resource_group_name = azurerm_resource_group.bosh.name
  sku                 = "Standard"

  frontend_ip_configuration {
    name                 = "${var.env_id}-concourse-frontend"
    public_ip_address_id = azurerm_public_ip.concourse.id
  }
}

resource "azurerm_lb_backend_address_pool" "concourse" {
  name            = "${var.env_id}-concourse-backend-pool"
  loadbalancer_id = azurerm_lb.concourse.id
}

resource "azurerm_lb_probe" "concourse" {
  name            = "${var.env_id}-concourse-probe"
  loadbalancer_id = azurerm_lb.concourse.id
  protocol        = "Tcp"
  port            = 443
}

resource "azurerm_lb_rule" "concourse" {
  for_each                       = toset(["80", "443", "2222"])
  name                           = "${var.env_id}-concourse-${each.value}"
  loadbalancer_id                = azurerm_lb.concourse.id
  protocol                       = "Tcp"
  frontend_port                  = tonumber(each.value)
  backend_port                   = tonumber(each.value)
  frontend_ip_configuration_name = "${var.env_id}-concourse-frontend"
  backend_address_pool_ids       = [azurerm_lb_backend_address_pool.concourse.id]
  probe_id                       = azurerm_lb_probe.concourse.id
}

output "concourse_lb_name" {
  value = azurerm_lb.concourse.name
}

output "concourse_lb_ip" {
  value = azurerm_public_ip.concourse.ip_address
}
"#;
