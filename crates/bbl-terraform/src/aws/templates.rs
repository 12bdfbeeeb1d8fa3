//! AWS terraform templates

pub const BASE: &str = r#"variable "env_id" {
  type = string
}

variable "short_env_id" {
  type = string
}

variable "access_key" {
  type = string
}

variable "secret_key" {
  type = string
}

variable "region" {
  type = string
}

variable "availability_zones" {
  type = list(string)
}

variable "bosh_inbound_cidr" {
  default = "0.0.0.0/0"
}

variable "vpc_cidr" {
  default = "10.0.0.0/16"
}

provider "aws" {
  access_key = var.access_key
  secret_key = var.secret_key
  region     = var.region
}

resource "aws_vpc" "vpc" {
  cidr_block           = var.vpc_cidr
  instance_tenancy     = "default"
  enable_dns_hostnames = true

  tags = {
    Name = "${var.env_id}-vpc"
  }
}

resource "aws_internet_gateway" "ig" {
  vpc_id = aws_vpc.vpc.id
}

resource "aws_subnet" "bosh_subnet" {
  vpc_id            = aws_vpc.vpc.id
  cidr_block        = cidrsubnet(var.vpc_cidr, 8, 0)
  availability_zone = var.availability_zones[0]

  tags = {
    Name = "${var.env_id}-bosh-subnet"
  }
}

resource "aws_route_table" "bosh_route_table" {
  vpc_id = aws_vpc.vpc.id

  route {
    cidr_block = "0.0.0.0/0"
    gateway_id = aws_internet_gateway.ig.id
  }
}

resource "aws_route_table_association" "bosh_route_table_association" {
  subnet_id      = aws_subnet.bosh_subnet.id
  route_table_id = aws_route_table.bosh_route_table.id
}

resource "aws_eip" "nat_eip" {
  domain = "vpc"
}

resource "aws_nat_gateway" "nat" {
  allocation_id = aws_eip.nat_eip.id
  subnet_id     = aws_subnet.bosh_subnet.id

  tags = {
    Name = "${var.env_id}-nat"
  }
}

resource "aws_subnet" "internal_subnets" {
  count             = length(var.availability_zones)
  vpc_id            = aws_vpc.vpc.id
  cidr_block        = cidrsubnet(var.vpc_cidr, 4, count.index + 1)
  availability_zone = element(var.availability_zones, count.index)

  tags = {
    Name = "${var.env_id}-internal-subnet${count.index}"
  }
}

resource "aws_route_table" "internal_route_table" {
  vpc_id = aws_vpc.vpc.id

  route {
    cidr_block     = "0.0.0.0/0"
    nat_gateway_id = aws_nat_gateway.nat.id
  }
}

resource "aws_route_table_association" "internal_route_table_association" {
  count          = length(var.availability_zones)
  subnet_id      = element(aws_subnet.internal_subnets.*.id, count.index)
  route_table_id = aws_route_table.internal_route_table.id
}

resource "aws_security_group" "jumpbox" {
  name        = "${var.env_id}-jumpbox-security-group"
  description = "Jumpbox"
  vpc_id      = aws_vpc.vpc.id

  ingress {
    protocol    = "tcp"
    from_port   = 22
    to_port     = 22
    cidr_blocks = [var.bosh_inbound_cidr]
  }

  ingress {
    protocol    = "tcp"
    from_port   = 6868
    to_port     = 6868
    cidr_blocks = [var.bosh_inbound_cidr]
  }

  egress {
    protocol    = "-1"
    from_port   = 0
    to_port     = 0
    cidr_blocks = ["0.0.0.0/0"]
  }
}

resource "aws_security_group" "bosh_security_group" {
  name        = "${var.env_id}-bosh-security-group"
  description = "BOSH director"
  vpc_id      = aws_vpc.vpc.id

  ingress {
    protocol        = "tcp"
    from_port       = 22
    to_port         = 22
    security_groups = [aws_security_group.jumpbox.id]
  }

  ingress {
    protocol        = "tcp"
    from_port       = 6868
    to_port         = 6868
    security_groups = [aws_security_group.jumpbox.id]
  }

  ingress {
    protocol        = "tcp"
    from_port       = 25555
    to_port         = 25555
    security_groups = [aws_security_group.jumpbox.id]
  }

  ingress {
    protocol        = "tcp"
    from_port       = 8443
    to_port         = 8844
    security_groups = [aws_security_group.jumpbox.id]
  }

  egress {
    protocol    = "-1"
    from_port   = 0
    to_port     = 0
    cidr_blocks = ["0.0.0.0/0"]
  }
}

resource "aws_security_group" "internal_security_group" {
  name        = "${var.env_id}-internal-security-group"
  description = "Internal"
  vpc_id      = aws_vpc.vpc.id

  ingress {
    protocol  = "-1"
    from_port = 0
    to_port   = 0
    self      = true
  }

  ingress {
    protocol        = "-1"
    from_port       = 0
    to_port         = 0
    security_groups = [aws_security_group.bosh_security_group.id]
  }

  egress {
    protocol    = "-1"
    from_port   = 0
    to_port     = 0
    cidr_blocks = ["0.0.0.0/0"]
  }
}

resource "aws_security_group_rule" "bosh_internal" {
  type                     = "ingress"
  protocol                 = "-1"
  from_port                = 0
  to_port                  = 0
  security_group_id        = aws_security_group.bosh_security_group.id
  source_security_group_id = aws_security_group.internal_security_group.id
}

resource "aws_eip" "jumpbox_eip" {
  domain = "vpc"
}

resource "tls_private_key" "bosh_vms" {
  algorithm = "RSA"
  rsa_bits  = 4096
}

resource "aws_key_pair" "bosh_vms" {
  key_name   = "${var.env_id}_bosh_vms"
  public_key = tls_private_key.bosh_vms.public_key_openssh
}

resource "aws_iam_role" "bosh" {
  name = "${var.env_id}_bosh_role"
  path = "/"

  assume_role_policy = jsonencode({
    Version = "2012-10-17"
    Statement = [{
      Action    = "sts:AssumeRole"
      Effect    = "Allow"
      Principal = { Service = "ec2.amazonaws.com" }
    }]
  })
}

resource "aws_iam_role_policy" "bosh" {
  name = "${var.env_id}_bosh_policy"
  role = aws_iam_role.bosh.id

  policy = jsonencode({
    Version = "2012-10-17"
    Statement = [{
      Effect = "Allow"
      Action = [
        "ec2:*",
        "elasticloadbalancing:*",
        "iam:PassRole",
        "kms:*",
      ]
      Resource = "*"
    }]
  })
}

resource "aws_iam_instance_profile" "bosh" {
  name = "${var.env_id}-bosh"
  role = aws_iam_role.bosh.name
}

resource "aws_kms_key" "kms_key" {
  enable_key_rotation = true
}

output "vpc_id" {
  value = aws_vpc.vpc.id
}

output "external_ip" {
  value = aws_eip.jumpbox_eip.public_ip
}

output "jumpbox_url" {
  value = "${aws_eip.jumpbox_eip.public_ip}:22"
}

output "director_address" {
  value = "https://${cidrhost(aws_subnet.bosh_subnet.cidr_block, 6)}:25555"
}

output "internal_cidr" {
  value = aws_subnet.bosh_subnet.cidr_block
}

output "internal_gw" {
  value = cidrhost(aws_subnet.bosh_subnet.cidr_block, 1)
}

output "internal_ip" {
  value = cidrhost(aws_subnet.bosh_subnet.cidr_block, 6)
}

output "jumpbox_internal_ip" {
  value = cidrhost(aws_subnet.bosh_subnet.cidr_block, 5)
}

output "subnet_id" {
  value = aws_subnet.bosh_subnet.id
}

output "az" {
  value = aws_subnet.bosh_subnet.availability_zone
}

output "default_security_groups" {
  value = [aws_security_group.bosh_security_group.id]
}

output "jumpbox_security_group" {
  value = aws_security_group.jumpbox.id
}

output "internal_security_group" {
  value = aws_security_group.internal_security_group.id
}

output "internal_subnet_ids" {
  value = aws_subnet.internal_subnets.*.id
}

output "internal_subnet_cidrs" {
  value = aws_subnet.internal_subnets.*.cidr_block
}

output "default_key_name" {
  value = aws_key_pair.bosh_vms.key_name
}

output "private_key" {
  value     = tls_private_key.bosh_vms.private_key_pem
  sensitive = true
}

output "iam_instance_profile" {
  value = aws_iam_instance_profile.bosh.name
}

output "kms_key_arn" {
  value = aws_kms_key.kms_key.arn
}
"#;

pub const LB_SUBNETS: &str = r#"resource "aws_subnet" "lb_subnets" {
  count             = length(var.availability_zones)
  vpc_id            = aws_vpc.vpc.id
  cidr_block        = cidrsubnet(var.vpc_cidr, 8, count.index + 2)
  availability_zone = element(var.availability_zones, count.index)

  tags = {
    Name = "${var.env_id}-lb-subnet${count.index}"
  }
}

resource "aws_route_table_association" "lb_route_table_association" {
  count          = length(var.availability_zones)
  subnet_id      = element(aws_subnet.lb_subnets.*.id, count.index)
  route_table_id = aws_route_table.bosh_route_table.id
}
"#;

pub const CF_LB: &str = r#"variable "ssl_certificate" {
  type = string
}

variable "ssl_certificate_private_key" {
  type = string
}

variable "ssl_certificate_chain" {
  type    = string
  default = ""
}

resource "aws_iam_server_certificate" "lb_cert" {
  name_prefix       = "${var.short_env_id}-"
  certificate_body  = file(var.ssl_certificate)
  private_key       = file(var.ssl_certificate_private_key)
  certificate_chain = var.ssl_certificate_chain == "" ? null : file(var.ssl_certificate_chain)

  lifecycle {
    create_before_destroy = true
  }
}

resource "aws_security_group" "cf_router_lb_security_group" {
  name   = "${var.env_id}-cf-router-lb-security-group"
  vpc_id = aws_vpc.vpc.id

  ingress {
    protocol    = "tcp"
    from_port   = 80
    to_port     = 80
    cidr_blocks = ["0.0.0.0/0"]
  }

  ingress {
    protocol    = "tcp"
    from_port   = 443
    to_port     = 443
    cidr_blocks = ["0.0.0.0/0"]
  }

  ingress {
    protocol    = "tcp"
    from_port   = 4443
    to_port     = 4443
    cidr_blocks = ["0.0.0.0/0"]
  }

  egress {
    protocol    = "-1"
    from_port   = 0
    to_port     = 0
    cidr_blocks = ["0.0.0.0/0"]
  }
}

resource "aws_security_group" "cf_router_lb_internal_security_group" {
  name   = "${var.env_id}-cf-router-lb-internal-security-group"
  vpc_id = aws_vpc.vpc.id

  ingress {
    protocol        = "tcp"
    from_port       = 80
    to_port         = 80
    security_groups = [aws_security_group.cf_router_lb_security_group.id]
  }

  egress {
    protocol    = "-1"
    from_port   = 0
    to_port     = 0
    cidr_blocks = ["0.0.0.0/0"]
  }
}

resource "aws_elb" "cf_router_lb" {
  name                      = "${var.short_env_id}-cf-router-lb"
  cross_zone_load_balancing = true
  subnets                   = aws_subnet.lb_subnets.*.id
  security_groups           = [aws_security_group.cf_router_lb_security_group.id]

  health_check {
    healthy_threshold   = 5
    unhealthy_threshold = 2
    interval            = 12
    target              = "tcp:80"
    timeout             = 2
  }

  listener {
    instance_port     = 80
    instance_protocol = "http"
    lb_port           = 80
    lb_protocol       = "http"
  }

  listener {
    instance_port      = 80
    instance_protocol  = "http"
    lb_port            = 443
    lb_protocol        = "https"
    ssl_certificate_id = aws_iam_server_certificate.lb_cert.arn
  }

  listener {
    instance_port      = 80
    instance_protocol  = "tcp"
    lb_port            = 4443
    lb_protocol        = "ssl"
    ssl_certificate_id = aws_iam_server_certificate.lb_cert.arn
  }
}

resource "aws_security_group" "cf_ssh_lb_security_group" {
  name   = "${var.env_id}-cf-ssh-lb-security-group"
  vpc_id = aws_vpc.vpc.id

  ingress {
    protocol    = "tcp"
    from_port   = 2222
    to_port     = 2222
    cidr_blocks = ["0.0.0.0/0"]
  }

  egress {
    protocol    = "-1"
    from_port   = 0
    to_port     = 0
    cidr_blocks = ["0.0.0.0/0"]
  }
}

resource "aws_security_group" "cf_ssh_lb_internal_security_group" {
  name   = "${var.env_id}-cf-ssh-lb-internal-security-group"
  vpc_id = aws_vpc.vpc.id

  ingress {
    protocol        = "tcp"
    from_port       = 2222
    to_port         = 2222
    security_groups = [aws_security_group.cf_ssh_lb_security_group.id]
  }

  egress {
    protocol    = "-1"
    from_port   = 0
    to_port     = 0
    cidr_blocks = ["0.0.0.0/0"]
  }
}

resource "aws_elb" "cf_ssh_lb" {
  name                      = "${var.short_env_id}-cf-ssh-lb"
  cross_zone_load_balancing = true
  subnets                   = aws_subnet.lb_subnets.*.id
  security_groups           = [aws_security_group.cf_ssh_lb_security_group.id]

  health_check {
    healthy_threshold   = 5
    unhealthy_threshold = 2
    interval            = 6
    target              = "tcp:2222"
    timeout             = 2
  }

  listener {
    instance_port     = 2222
    instance_protocol = "tcp"
    lb_port           = 2222
    lb_protocol       = "tcp"
  }
}

resource "aws_security_group" "cf_tcp_lb_security_group" {
  name   = "${var.env_id}-cf-tcp-lb-security-group"
  vpc_id = aws_vpc.vpc.id

  ingress {
    protocol    = "tcp"
    from_port   = 1024
    to_port     = 1123
    cidr_blocks = ["0.0.0.0/0"]
  }

  egress {
    protocol    = "-1"
    from_port   = 0
    to_port     = 0
    cidr_blocks = ["0.0.0.0/0"]
  }
}

resource "aws_security_group" "cf_tcp_lb_internal_security_group" {
  name   = "${var.env_id}-cf-tcp-lb-internal-security-group"
  vpc_id = aws_vpc.vpc.id

  ingress {
    protocol        = "tcp"
    from_port       = 1024
    to_port         = 1123
    security_groups = [aws_security_group.cf_tcp_lb_security_group.id]
  }

  ingress {
    protocol        = "tcp"
    from_port       = 80
    to_port         = 80
    security_groups = [aws_security_group.cf_tcp_lb_security_group.id]
  }

  egress {
    protocol    = "-1"
    from_port   = 0
    to_port     = 0
    cidr_blocks = ["0.0.0.0/0"]
  }
}

resource "aws_elb" "cf_tcp_lb" {
  name                      = "${var.short_env_id}-cf-tcp-lb"
  cross_zone_load_balancing = true
  subnets                   = aws_subnet.lb_subnets.*.id
  security_groups           = [aws_security_group.cf_tcp_lb_security_group.id]

  health_check {
    healthy_threshold   = 6
    unhealthy_threshold = 3
    interval            = 5
    target              = "tcp:80"
    timeout             = 3
  }

  dynamic "listener" {
    for_each = range(1024, 1034)
    content {
      instance_port     = listener.value
      instance_protocol = "tcp"
      lb_port           = listener.value
      lb_protocol       = "tcp"
    }
  }
}

resource "aws_security_group" "credhub_lb_security_group" {
  name   = "${var.env_id}-credhub-lb-security-group"
  vpc_id = aws_vpc.vpc.id

  ingress {
    protocol    = "tcp"
    from_port   = 8844
    to_port     = 8844
    cidr_blocks = ["0.0.0.0/0"]
  }

  egress {
    protocol    = "-1"
    from_port   = 0
    to_port     = 0
    cidr_blocks = ["0.0.0.0/0"]
  }
}

resource "aws_security_group" "credhub_lb_internal_security_group" {
  name   = "${var.env_id}-credhub-lb-internal-security-group"
  vpc_id = aws_vpc.vpc.id

  ingress {
    protocol        = "tcp"
    from_port       = 8844
    to_port         = 8844
    security_groups = [aws_security_group.credhub_lb_security_group.id]
  }

  egress {
    protocol    = "-1"
    from_port   = 0
    to_port     = 0
    cidr_blocks = ["0.0.0.0/0"]
  }
}

resource "aws_lb" "credhub_lb" {
  name               = "${var.short_env_id}-credhub-lb"
  load_balancer_type = "network"
  subnets            = aws_subnet.lb_subnets.*.id
}

resource "aws_lb_target_group" "credhub" {
  name     = "${var.short_env_id}-credhub"
  port     = 8844
  protocol = "TCP"
  vpc_id   = aws_vpc.vpc.id
}

resource "aws_lb_listener" "credhub" {
  load_balancer_arn = aws_lb.credhub_lb.arn
  port              = 8844
  protocol          = "TCP"

  default_action {
    type             = "forward"
    target_group_arn = aws_lb_target_group.credhub.arn
  }
}

output "cf_router_lb_name" {
  value = aws_elb.cf_router_lb.name
}

output "cf_router_lb_url" {
  value = aws_elb.cf_router_lb.dns_name
}

output "cf_router_lb_internal_security_group" {
  value = aws_security_group.cf_router_lb_internal_security_group.id
}

output "cf_ssh_lb_name" {
  value = aws_elb.cf_ssh_lb.name
}

output "cf_ssh_lb_url" {
  value = aws_elb.cf_ssh_lb.dns_name
}

output "cf_ssh_lb_internal_security_group" {
  value = aws_security_group.cf_ssh_lb_internal_security_group.id
}

output "cf_tcp_lb_name" {
  value = aws_elb.cf_tcp_lb.name
}

output "cf_tcp_lb_url" {
  value = aws_elb.cf_tcp_lb.dns_name
}

output "cf_tcp_lb_internal_security_group" {
  value = aws_security_group.cf_tcp_lb_internal_security_group.id
}

output "credhub_target_group" {
  value = aws_lb_target_group.credhub.name
}

output "credhub_lb_url" {
  value = aws_lb.credhub_lb.dns_name
}

output "credhub_lb_internal_security_group" {
  value = aws_security_group.credhub_lb_internal_security_group.id
}
"#;

pub const CF_DNS: &str = r#"variable "system_domain" {
  type = string
}

resource "aws_route53_zone" "env_dns_zone" {
  name = var.system_domain

  tags = {
    Name = "${var.env_id}-hosted-zone"
  }
}

resource "aws_route53_record" "wildcard_dns" {
  zone_id = aws_route53_zone.env_dns_zone.id
  name    = "*.${var.system_domain}"
  type    = "CNAME"
  ttl     = 300
  records = [aws_elb.cf_router_lb.dns_name]
}

resource "aws_route53_record" "ssh" {
  zone_id = aws_route53_zone.env_dns_zone.id
  name    = "ssh.${var.system_domain}"
  type    = "CNAME"
  ttl     = 300
  records = [aws_elb.cf_ssh_lb.dns_name]
}

resource "aws_route53_record" "tcp" {
  zone_id = aws_route53_zone.env_dns_zone.id
  name    = "tcp.${var.system_domain}"
  type    = "CNAME"
  ttl     = 300
  records = [aws_elb.cf_tcp_lb.dns_name]
}

output "env_dns_zone_name_servers" {
  value = aws_route53_zone.env_dns_zone.name_servers
}
"#;

pub const CONCOURSE_LB: &str = r#"resource "aws_security_group" "concourse_lb_security_group" {
  name   = "${var.env_id}-concourse-lb-security-group"
  vpc_id = aws_vpc.vpc.id

  ingress {
    protocol    = "tcp"
    from_port   = 80
    to_port     = 80
    cidr_blocks = ["0.0.0.0/0"]
  }

  ingress {
    protocol    = "tcp"
    from_port   = 443
    to_port     = 443
    cidr_blocks = ["0.0.0.0/0"]
  }

  ingress {
    protocol    = "tcp"
    from_port   = 2222
    to_port     = 2222
    cidr_blocks = ["0.0.0.0/0"]
  }

  egress {
    protocol    = "-1"
    from_port   = 0
    to_port     = 0
    cidr_blocks = ["0.0.0.0/0"]
  }
}

resource "aws_security_group" "concourse_lb_internal_security_group" {
  name   = "${var.env_id}-concourse-lb-internal-security-group"
  vpc_id = aws_vpc.vpc.id

  ingress {
    protocol        = "tcp"
    from_port       = 0
    to_port         = 65535
    security_groups = [aws_security_group.concourse_lb_security_group.id]
  }

  egress {
    protocol    = "-1"
    from_port   = 0
    to_port     = 0
    cidr_blocks = ["0.0.0.0/0"]
  }
}

resource "aws_elb" "concourse_lb" {
  name                      = "${var.short_env_id}-concourse-lb"
  cross_zone_load_balancing = true
  subnets                   = aws_subnet.lb_subnets.*.id
  security_groups           = [aws_security_group.concourse_lb_security_group.id]

  health_check {
    healthy_threshold   = 2
    unhealthy_threshold = 10
    interval            = 30
    target              = "tcp:8080"
    timeout             = 5
  }

  listener {
    instance_port     = 8080
    instance_protocol = "tcp"
    lb_port           = 80
    lb_protocol       = "tcp"
  }

  listener {
    instance_port     = 4443
    instance_protocol = "tcp"
    lb_port           = 443
    lb_protocol       = "tcp"
  }

  listener {
    instance_port     = 2222
    instance_protocol = "tcp"
    lb_port           = 2222
    lb_protocol       = "tcp"
  }
}

output "concourse_lb_name" {
  value = aws_elb.concourse_lb.name
}

output "concourse_lb_url" {
  value = aws_elb.concourse_lb.dns_name
}

output "concourse_lb_internal_security_group" {
  value = aws_security_group.concourse_lb_internal_security_group.id
}
"#;
